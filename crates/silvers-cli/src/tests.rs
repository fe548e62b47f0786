use std::collections::BTreeMap;

use rust_decimal::Decimal;
use silvers_core::{Product, ProductOption};

use super::*;
use crate::orders::{parse_cart_file, selection_for};

fn option(id: &str, title: &str, value: &str) -> ProductOption {
    ProductOption {
        id: id.to_string(),
        title: title.to_string(),
        value: value.to_string(),
        identifier_value: value.to_string(),
        identifier_type: "text".to_string(),
    }
}

fn ring() -> Product {
    Product {
        id: "7".to_string(),
        name: "Twist Ring".to_string(),
        description: String::new(),
        price: Decimal::new(4500, 2),
        original_price: None,
        images: vec!["https://cdn.example.com/ring.jpg".to_string()],
        category: "Rings".to_string(),
        category_id: "rings".to_string(),
        collection: None,
        brand: "Silvers".to_string(),
        vendor: None,
        rating: None,
        review_count: None,
        in_stock: true,
        stock_quantity: 3,
        tags: Vec::new(),
        options: vec![option("s1", "Size", "6"), option("s2", "Size", "7")],
        specifications: BTreeMap::new(),
        created_at: String::new(),
        updated_at: String::new(),
    }
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["silvers"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn products_defaults_to_newest_without_filters() {
    let cli = Cli::try_parse_from(["silvers", "products"]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Products {
            featured: false,
            search: None,
            category: None,
            min_price: None,
            max_price: None,
            in_stock: false,
            sort: SortKey::Newest,
        })
    ));
}

#[test]
fn products_accepts_filters_and_sort() {
    let cli = Cli::try_parse_from([
        "silvers",
        "products",
        "--featured",
        "--search",
        "ring",
        "--max-price",
        "50.00",
        "--sort",
        "price_asc",
    ])
    .expect("expected valid cli args");

    match cli.command {
        Some(Commands::Products {
            featured,
            search,
            max_price,
            sort,
            ..
        }) => {
            assert!(featured);
            assert_eq!(search.as_deref(), Some("ring"));
            assert_eq!(max_price, Some(Decimal::new(5000, 2)));
            assert_eq!(sort, SortKey::PriceAsc);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn products_rejects_unknown_sort_key() {
    let result = Cli::try_parse_from(["silvers", "products", "--sort", "cheapest"]);
    assert!(result.is_err());
}

#[test]
fn orders_limit_defaults_to_ten() {
    let cli = Cli::try_parse_from(["silvers", "orders"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Some(Commands::Orders { limit: 10 })));
}

#[test]
fn checkout_requires_cart_and_customer() {
    assert!(Cli::try_parse_from(["silvers", "checkout", "--cart", "cart.json"]).is_err());

    let cli = Cli::try_parse_from([
        "silvers",
        "checkout",
        "--cart",
        "cart.json",
        "--customer",
        "me.json",
    ])
    .expect("expected valid cli args");
    match cli.command {
        Some(Commands::Checkout {
            cart,
            customer,
            reference,
            quote,
        }) => {
            assert_eq!(cart, PathBuf::from("cart.json"));
            assert_eq!(customer, PathBuf::from("me.json"));
            assert!(reference.is_none());
            assert!(!quote);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn parses_checkout_quote_and_order_lookup() {
    let cli = Cli::try_parse_from([
        "silvers",
        "checkout",
        "--cart",
        "cart.json",
        "--customer",
        "me.json",
        "--quote",
    ])
    .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Checkout { quote: true, .. })
    ));

    let cli = Cli::try_parse_from(["silvers", "order", "ORD-1-abcdefghi"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Order { ref reference }) if reference == "ORD-1-abcdefghi"
    ));
}

#[test]
fn parses_favorites_add() {
    let cli = Cli::try_parse_from(["silvers", "favorites", "--file", "fav.json", "add", "7"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Favorites {
            command: FavoritesCommands::Add { ref id },
            ..
        }) if id == "7"
    ));
}

#[test]
fn parses_categories_tree_and_doctor() {
    let cli = Cli::try_parse_from(["silvers", "categories", "--tree"])
        .expect("expected valid cli args");
    assert!(matches!(cli.command, Some(Commands::Categories { tree: true })));

    let cli = Cli::try_parse_from(["silvers", "doctor"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Some(Commands::Doctor)));
}

#[test]
fn cart_file_defaults_quantity_and_options() {
    let lines = parse_cart_file(
        r#"[{"product_id": "7"}, {"product_id": "9", "quantity": 3, "options": ["s2"]}]"#,
    )
    .expect("valid cart file");

    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].quantity, 1);
    assert!(lines[0].options.is_empty());
    assert_eq!(lines[1].quantity, 3);
    assert_eq!(lines[1].options, vec!["s2".to_string()]);
}

#[test]
fn cart_file_rejects_empty_and_malformed_input() {
    assert!(parse_cart_file("[]").is_err());
    assert!(parse_cart_file(r#"{"product_id": "7"}"#).is_err());
}

#[test]
fn selection_resolves_option_ids() {
    let selection = selection_for(&ring(), &["s2".to_string()]).expect("known option");
    assert_eq!(selection.len(), 1);
    assert_eq!(selection.get("Size").map(|o| o.value.as_str()), Some("7"));
}

#[test]
fn selection_rejects_unknown_option() {
    let err = selection_for(&ring(), &["x9".to_string()]).unwrap_err();
    assert!(err.to_string().contains("x9"));
}

#[test]
fn favorites_remove_on_missing_file_leaves_nothing_behind() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("favorites.json");

    crate::catalog::run_favorites_list(&path).expect("missing file lists as empty");
    crate::catalog::run_favorites_remove(&path, "7").expect("removing an absent id is fine");

    assert!(!path.exists());
}
