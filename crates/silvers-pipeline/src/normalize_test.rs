use super::*;

const PLACEHOLDER: &str = "https://via.placeholder.com/400x400?text=No+Image";

fn mapper() -> ProductMapper {
    ProductMapper::new(PLACEHOLDER)
}

fn text(s: &str) -> Cell {
    Cell::Text(s.to_string())
}

/// A fully populated product row as the decoder would produce it.
fn product_record(overrides: &[(&str, Cell)]) -> Record {
    let mut fields: Vec<(String, Cell)> = vec![
        ("id".into(), Cell::Integer(42)),
        ("title".into(), text("Oxidised Silver Ring")),
        ("excerpt".into(), text("Hand-finished band")),
        ("notes".into(), text("Internal notes")),
        ("price".into(), Cell::Float(40.0)),
        ("saleprice".into(), Cell::Float(0.0)),
        ("image".into(), text("https://img.example/main.jpg")),
        (
            "medias".into(),
            text(r#"["https://img.example/g1.jpg", "", "https://img.example/g2.jpg"]"#),
        ),
        ("category".into(), text("Silver Rings")),
        ("collection".into(), text("Festive")),
        ("brand".into(), text("Silvers")),
        ("vendor".into(), text("  ")),
        ("stock".into(), Cell::Integer(5)),
        ("tags".into(), text("ring, silver,, oxidised ")),
        (
            "options".into(),
            text(
                r#"[{"id": 7, "title": "Size", "value": "7", "identifierType": "text"},
                    {"id": "8", "title": "Size", "value": "8", "identifierValue": "Size 8"}]"#,
            ),
        ),
        ("metafields".into(), text(r#"{"Material": "925 Silver", "Weight": 4.2, "Gift": null}"#)),
        ("createdat".into(), text("2025-02-01 10:00:00")),
        ("updatedat".into(), text("2025-02-03 09:30:00")),
    ];
    for (name, cell) in overrides {
        if let Some(slot) = fields.iter_mut().find(|(n, _)| n == name) {
            slot.1 = cell.clone();
        } else {
            fields.push(((*name).to_string(), cell.clone()));
        }
    }
    fields.into_iter().collect()
}

// -----------------------------------------------------------------------
// products
// -----------------------------------------------------------------------

#[test]
fn maps_identity_and_text_fields() {
    let product = mapper().map_product(&product_record(&[]));
    assert_eq!(product.id, "42");
    assert_eq!(product.name, "Oxidised Silver Ring");
    assert_eq!(product.description, "Hand-finished band");
    assert_eq!(product.collection.as_deref(), Some("Festive"));
    assert_eq!(product.brand, "Silvers");
    assert_eq!(product.created_at, "2025-02-01 10:00:00");
}

#[test]
fn description_falls_back_to_notes() {
    let product = mapper().map_product(&product_record(&[("excerpt", text(""))]));
    assert_eq!(product.description, "Internal notes");
}

#[test]
fn images_put_primary_first_and_drop_blanks() {
    let product = mapper().map_product(&product_record(&[]));
    assert_eq!(
        product.images,
        vec![
            "https://img.example/main.jpg",
            "https://img.example/g1.jpg",
            "https://img.example/g2.jpg"
        ]
    );
}

#[test]
fn images_fall_back_to_placeholder() {
    let product = mapper().map_product(&product_record(&[
        ("image", text("")),
        ("medias", text("not json")),
    ]));
    assert_eq!(product.images, vec![PLACEHOLDER]);
}

#[test]
fn gallery_accepts_url_objects() {
    let product = mapper().map_product(&product_record(&[
        ("image", text("")),
        ("medias", text(r#"[{"url": "https://img.example/o.jpg"}, 3]"#)),
    ]));
    assert_eq!(product.images, vec!["https://img.example/o.jpg"]);
}

#[test]
fn sale_price_below_list_discounts_and_keeps_original() {
    let product = mapper().map_product(&product_record(&[("saleprice", Cell::Float(32.5))]));
    assert_eq!(product.price, Decimal::new(325, 1));
    assert_eq!(product.original_price, Some(Decimal::new(40, 0)));
    assert!(product.is_on_sale());
}

#[test]
fn zero_sale_price_keeps_list_price() {
    let product = mapper().map_product(&product_record(&[]));
    assert_eq!(product.price, Decimal::new(40, 0));
    assert!(product.original_price.is_none());
}

#[test]
fn sale_price_at_or_above_list_is_ignored() {
    let product = mapper().map_product(&product_record(&[("saleprice", Cell::Float(45.0))]));
    assert_eq!(product.price, Decimal::new(40, 0));
    assert!(product.original_price.is_none());
}

#[test]
fn missing_or_garbage_price_is_zero_not_nan() {
    let product = mapper().map_product(&product_record(&[("price", text("free!"))]));
    assert_eq!(product.price, Decimal::ZERO);
}

#[test]
fn negative_list_price_clamps_to_zero() {
    let (price, original) = resolve_price(Decimal::new(-5, 0), Decimal::ZERO);
    assert_eq!(price, Decimal::ZERO);
    assert!(original.is_none());
}

#[test]
fn category_id_is_slugified() {
    let product = mapper().map_product(&product_record(&[("category", text("Toe  Rings For Her"))]));
    assert_eq!(product.category_id, "toe-rings-for-her");
}

#[test]
fn brand_defaults_and_blank_vendor_is_absent() {
    let product = mapper().map_product(&product_record(&[("brand", text(""))]));
    assert_eq!(product.brand, "Unknown");
    assert!(product.vendor.is_none());
}

#[test]
fn stock_drives_in_stock_flag() {
    let product = mapper().map_product(&product_record(&[("stock", Cell::Integer(0))]));
    assert!(!product.in_stock);
    assert_eq!(product.stock_quantity, 0);
}

#[test]
fn tags_are_split_and_trimmed() {
    let product = mapper().map_product(&product_record(&[]));
    assert_eq!(product.tags, vec!["ring", "silver", "oxidised"]);
}

#[test]
fn options_are_parsed_with_identifier_fallback() {
    let product = mapper().map_product(&product_record(&[]));
    assert_eq!(product.options.len(), 2);
    assert_eq!(product.options[0].id, "7");
    assert_eq!(product.options[0].title, "Size");
    assert_eq!(product.options[0].identifier_value, "7");
    assert_eq!(product.options[1].identifier_value, "Size 8");
    assert_eq!(product.options[1].identifier_type, "text");
}

#[test]
fn options_without_id_get_positional_id() {
    let product = mapper().map_product(&product_record(&[(
        "options",
        text(r#"[{"title": "Finish", "value": "Matte"}]"#),
    )]));
    assert_eq!(product.options[0].id, "42-opt-0");
}

#[test]
fn malformed_options_default_to_empty() {
    let product = mapper().map_product(&product_record(&[("options", text("[{oops"))]));
    assert!(product.options.is_empty());
}

#[test]
fn specifications_come_from_metafields() {
    let product = mapper().map_product(&product_record(&[]));
    assert_eq!(
        product.specifications.get("Material").map(String::as_str),
        Some("925 Silver")
    );
    assert_eq!(product.specifications.get("Weight").map(String::as_str), Some("4.2"));
    assert!(!product.specifications.contains_key("Gift"));
}

#[test]
fn products_are_unrated_without_review_columns() {
    let product = mapper().map_product(&product_record(&[]));
    assert!(product.rating.is_none());
    assert!(product.review_count.is_none());
}

#[test]
fn review_columns_are_used_when_present() {
    let product = mapper().map_product(&product_record(&[
        ("rating", Cell::Float(7.3)),
        ("reviewcount", Cell::Integer(12)),
    ]));
    assert_eq!(product.rating, Some(5.0));
    assert_eq!(product.review_count, Some(12));
}

#[test]
fn mapping_is_deterministic() {
    let record = product_record(&[("options", text(r#"[{"title": "Size", "value": "6"}]"#))]);
    assert_eq!(mapper().map_product(&record), mapper().map_product(&record));
}

// -----------------------------------------------------------------------
// collections and categories
// -----------------------------------------------------------------------

#[test]
fn collection_copies_fields() {
    let record: Record = vec![
        ("id".to_string(), Cell::Integer(3)),
        ("name".to_string(), text("Festive")),
        ("image".to_string(), text("")),
        ("notes".to_string(), text("Diwali picks")),
    ]
    .into_iter()
    .collect();
    let collection = normalize_collection(&record);
    assert_eq!(collection.id, "3");
    assert_eq!(collection.name, "Festive");
    assert!(collection.image.is_none());
    assert_eq!(collection.notes.as_deref(), Some("Diwali picks"));
}

#[test]
fn category_parent_zero_means_top_level() {
    let record: Record = vec![
        ("id".to_string(), Cell::Integer(1)),
        ("name".to_string(), text("Rings")),
        ("parent_id".to_string(), Cell::Integer(0)),
    ]
    .into_iter()
    .collect();
    assert!(normalize_category(&record).parent_id.is_none());
}

#[test]
fn category_keeps_parent_reference() {
    let record: Record = vec![
        ("id".to_string(), Cell::Integer(2)),
        ("name".to_string(), text("Toe Rings")),
        ("description".to_string(), text("Traditional")),
        ("parent_id".to_string(), Cell::Integer(1)),
    ]
    .into_iter()
    .collect();
    let category = normalize_category(&record);
    assert_eq!(category.parent_id.as_deref(), Some("1"));
    assert_eq!(category.description.as_deref(), Some("Traditional"));
}
