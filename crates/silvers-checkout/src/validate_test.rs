use super::*;

fn address(street: &str, city: &str) -> Address {
    Address {
        street: street.to_string(),
        city: city.to_string(),
        ..Address::default()
    }
}

fn strict_customer() -> CustomerDetails {
    CustomerDetails {
        name: "Meera Iyer".into(),
        email: "meera@example.com".into(),
        phone: Some("(987) 654-3210".into()),
        shipping_address: Some(address("14 Temple Road", "Madurai")),
        billing_address: None,
        tax_id: Some("33aabcu9603r1zx".into()),
    }
}

#[test]
fn basic_requires_name_and_email() {
    let details = CustomerDetails::default();
    let errors = details.validate(ValidationProfile::Basic).unwrap_err();
    assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["email", "name"]);
}

#[test]
fn basic_accepts_minimal_details() {
    let details = CustomerDetails {
        name: "Meera".into(),
        email: "not-checked-in-basic".into(),
        ..CustomerDetails::default()
    };
    assert!(details.validate(ValidationProfile::Basic).is_ok());
}

#[test]
fn whitespace_name_is_missing() {
    let details = CustomerDetails {
        name: "   ".into(),
        email: "a@b.co".into(),
        ..CustomerDetails::default()
    };
    let errors = details.validate(ValidationProfile::Basic).unwrap_err();
    assert_eq!(errors.get("name"), Some("Name is required"));
    assert_eq!(errors.len(), 1);
}

#[test]
fn strict_accepts_complete_details() {
    assert!(strict_customer().validate(ValidationProfile::Strict).is_ok());
}

#[test]
fn strict_rejects_malformed_email() {
    let details = CustomerDetails {
        email: "meera@example".into(),
        ..strict_customer()
    };
    let errors = details.validate(ValidationProfile::Strict).unwrap_err();
    assert_eq!(errors.get("email"), Some("Email is invalid"));
}

#[test]
fn strict_counts_phone_digits_only() {
    let details = CustomerDetails {
        phone: Some("+91 98765".into()),
        ..strict_customer()
    };
    let errors = details.validate(ValidationProfile::Strict).unwrap_err();
    assert_eq!(errors.get("phone"), Some("Phone number must be 10 digits"));
}

#[test]
fn strict_requires_street_and_city() {
    let details = CustomerDetails {
        shipping_address: Some(address("", " ")),
        ..strict_customer()
    };
    let errors = details.validate(ValidationProfile::Strict).unwrap_err();
    assert!(errors.contains("address"));
    assert!(errors.contains("location"));
}

#[test]
fn strict_tax_id_rules() {
    let cases = [
        (None, "Tax ID is required"),
        (Some("33AABCU9603R1Z"), "Tax ID must be 15 characters"),
        (Some("33AABCU9603R0ZX"), "Tax ID format is invalid"),
    ];
    for (tax_id, expected) in cases {
        let details = CustomerDetails {
            tax_id: tax_id.map(str::to_string),
            ..strict_customer()
        };
        let errors = details.validate(ValidationProfile::Strict).unwrap_err();
        assert_eq!(errors.get("tax_id"), Some(expected), "tax id {tax_id:?}");
    }
}

#[test]
fn tax_id_is_uppercased() {
    assert_eq!(
        strict_customer().normalized_tax_id().as_deref(),
        Some("33AABCU9603R1ZX")
    );
}

#[test]
fn address_line_trims_dangling_separators() {
    assert_eq!(Address::format_line(Some(&address("14 Temple Road", "Madurai"))), "14 Temple Road, Madurai");
    assert_eq!(Address::format_line(Some(&address("", "Madurai"))), "Madurai");
    assert_eq!(Address::format_line(Some(&address("14 Temple Road", ""))), "14 Temple Road");
    assert_eq!(Address::format_line(Some(&address(" ", ""))), "Address not provided");
    assert_eq!(Address::format_line(None), "Address not provided");
}

#[test]
fn billing_falls_back_to_shipping() {
    let details = strict_customer();
    assert_eq!(details.billing_line(), "14 Temple Road, Madurai");

    let details = CustomerDetails {
        billing_address: Some(address("2 Office Lane", "Chennai")),
        ..strict_customer()
    };
    assert_eq!(details.billing_line(), "2 Office Lane, Chennai");
}

#[test]
fn errors_display_every_field() {
    let errors = CustomerDetails::default()
        .validate(ValidationProfile::Basic)
        .unwrap_err();
    assert_eq!(errors.to_string(), "email: Email is required; name: Name is required");
}
