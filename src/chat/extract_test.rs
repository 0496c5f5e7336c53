use super::*;

// =============================================================================
// year / vehicle
// =============================================================================

#[test]
fn year_found_in_plain_sentence() {
    assert_eq!(extract_year("2018 Honda Civic"), Some("2018".to_owned()));
    assert_eq!(extract_year("it's a honda from 1999"), Some("1999".to_owned()));
}

#[test]
fn year_bounds_are_inclusive() {
    assert_eq!(extract_year("1900 Ford"), Some("1900".to_owned()));
    assert_eq!(extract_year("2100 concept"), Some("2100".to_owned()));
    assert_eq!(extract_year("1899 carriage"), None);
    assert_eq!(extract_year("2101 hovercar"), None);
}

#[test]
fn year_skips_out_of_range_tokens() {
    assert_eq!(extract_year("1234 then 2020 Tacoma"), Some("2020".to_owned()));
}

#[test]
fn year_ignores_longer_digit_runs() {
    assert_eq!(extract_year("48104"), None);
    assert_eq!(extract_year("call 5551234567"), None);
    assert_eq!(extract_year("a honda civic"), None);
}

#[test]
fn vehicle_takes_words_after_year() {
    assert_eq!(extract_vehicle("2018 Honda Civic"), Some("Honda Civic".to_owned()));
    assert_eq!(
        extract_vehicle("2018 Honda Civic EX-L Sedan"),
        Some("Honda Civic EX-L".to_owned())
    );
}

#[test]
fn vehicle_stops_at_clause_break() {
    assert_eq!(extract_vehicle("2018 Honda Civic, 40k miles"), Some("Honda Civic".to_owned()));
}

#[test]
fn vehicle_none_when_year_is_last() {
    assert_eq!(extract_vehicle("Honda Civic 2018"), None);
    assert_eq!(extract_vehicle("Honda Civic 2018."), None);
}

#[test]
fn vehicle_follows_the_matched_year_not_an_earlier_substring() {
    assert_eq!(extract_vehicle("120184 2018 Honda Civic"), Some("Honda Civic".to_owned()));
    assert_eq!(extract_vehicle("1234 then 2020 Tacoma"), Some("Tacoma".to_owned()));
}

#[test]
fn vehicle_none_without_year() {
    assert_eq!(extract_vehicle("a honda civic"), None);
}

// =============================================================================
// mileage / title
// =============================================================================

#[test]
fn mileage_with_thousands_separator() {
    assert_eq!(extract_mileage("45,000 miles, clean title"), Some("45,000".to_owned()));
    assert_eq!(extract_mileage("1,204,000 miles"), Some("1,204,000".to_owned()));
}

#[test]
fn mileage_shorthand_and_plain_numbers() {
    assert_eq!(extract_mileage("about 45k miles"), Some("45k".to_owned()));
    assert_eq!(extract_mileage("45 k mi"), Some("45 k".to_owned()));
    assert_eq!(extract_mileage("120000 Miles"), Some("120000".to_owned()));
    assert_eq!(extract_mileage("1 mile"), Some("1".to_owned()));
}

#[test]
fn mileage_requires_unit() {
    assert_eq!(extract_mileage("45000"), None);
    assert_eq!(extract_mileage("clean title"), None);
    assert_eq!(extract_mileage("45000 milestones"), None);
}

#[test]
fn title_status_keeps_typed_case() {
    assert_eq!(extract_title_status("Clean title"), Some("Clean".to_owned()));
    assert_eq!(extract_title_status("it's REBUILT"), Some("REBUILT".to_owned()));
    assert_eq!(extract_title_status("salvage"), Some("salvage".to_owned()));
}

#[test]
fn title_status_rejects_partial_words() {
    assert_eq!(extract_title_status("cleaning it up"), None);
    assert_eq!(extract_title_status("lien on it"), None);
}

// =============================================================================
// zip
// =============================================================================

#[test]
fn zip_five_digits() {
    assert_eq!(extract_zip("48104"), Some("48104".to_owned()));
    assert_eq!(extract_zip("I'm in 90210 area"), Some("90210".to_owned()));
}

#[test]
fn zip_plus_four() {
    assert_eq!(extract_zip("48104-1234"), Some("48104-1234".to_owned()));
}

#[test]
fn zip_rejects_other_lengths() {
    assert_eq!(extract_zip("4810"), None);
    assert_eq!(extract_zip("481045"), None);
}

// =============================================================================
// contact / sign-in
// =============================================================================

#[test]
fn email_extracted_from_sentence() {
    assert_eq!(extract_email("sure, test@example.com"), Some("test@example.com".to_owned()));
    assert_eq!(extract_email("no email here"), None);
    assert_eq!(extract_email("half@address"), None);
}

#[test]
fn phone_formats() {
    assert_eq!(extract_phone("555-123-4567"), Some("555-123-4567".to_owned()));
    assert_eq!(extract_phone("(555) 123-4567"), Some("(555) 123-4567".to_owned()));
    assert_eq!(extract_phone("text me at 5551234567"), Some("5551234567".to_owned()));
    assert_eq!(extract_phone("+1 555.123.4567"), Some("+1 555.123.4567".to_owned()));
}

#[test]
fn phone_rejects_short_numbers() {
    assert_eq!(extract_phone("48104"), None);
    assert_eq!(extract_phone("123-4567"), None);
}

#[test]
fn contact_prefers_email() {
    let contact = extract_contact("test@example.com or 555-123-4567");
    assert_eq!(contact, Some(Contact::Email("test@example.com".to_owned())));
    assert_eq!(contact.as_ref().map(Contact::as_str), Some("test@example.com"));
}

#[test]
fn contact_falls_back_to_phone() {
    assert_eq!(extract_contact("555-123-4567"), Some(Contact::Phone("555-123-4567".to_owned())));
    assert_eq!(extract_contact("not now"), None);
}

#[test]
fn sign_in_intent_is_case_insensitive() {
    assert!(wants_sign_in("Sign me in"));
    assert!(wants_sign_in("LOGIN"));
    assert!(wants_sign_in("ok let me signup"));
    assert!(!wants_sign_in("not now"));
    assert!(!wants_sign_in("log me in later"));
}
