use crate::errors::{Error, FieldErrors};

use super::models::{
    Address, CardDetails, Dimensions, NonPrescriptionItem, Prescription, MAX_PRESCRIPTION_WEIGHT,
};

fn required(errors: &mut FieldErrors, field: &str, value: &str, message: &str) {
    if value.trim().is_empty() {
        errors.insert(field, message);
    }
}

fn dimensions(errors: &mut FieldErrors, dims: &Dimensions) {
    for (name, value) in [
        ("length", dims.length),
        ("width", dims.width),
        ("height", dims.height),
    ] {
        if !(value > 0.0) {
            errors.insert(
                format!("dimensions.{name}"),
                format!("The {name} must be greater than 0 cm"),
            );
        }
    }
}

pub fn address(address: &Address) -> Result<(), Error> {
    let mut errors = FieldErrors::new();
    required(&mut errors, "street", &address.street, "Street address is required");
    required(&mut errors, "city", &address.city, "City is required");
    required(&mut errors, "postalCode", &address.postal_code, "Postal code is required");
    required(&mut errors, "country", &address.country, "Country is required");
    errors.into_result()
}

pub fn card(card: &CardDetails) -> Result<(), Error> {
    let mut errors = FieldErrors::new();
    required(&mut errors, "cardNumber", &card.card_number, "Card number is required");
    required(&mut errors, "cardHolder", &card.card_holder, "Card holder is required");
    required(&mut errors, "insuranceId", &card.insurance_id, "Insurance ID is required");
    errors.into_result()
}

pub fn prescription(prescription: &Prescription) -> Result<(), Error> {
    let mut errors = FieldErrors::new();
    required(&mut errors, "title", &prescription.title, "Title is required");
    required(
        &mut errors,
        "description",
        &prescription.description,
        "Description is required",
    );

    if !(prescription.weight > 0.0) {
        errors.insert("weight", "Weight must be greater than 0 g");
    } else if prescription.weight > MAX_PRESCRIPTION_WEIGHT {
        errors.insert("weight", "Weight must not exceed 5000 g");
    }

    dimensions(&mut errors, &prescription.dimensions);

    if let Some(fee) = prescription.prescription_fee {
        if !(fee >= 0.0) {
            errors.insert("prescriptionFee", "Prescription fee cannot be negative");
        }
    }

    errors.into_result()
}

pub fn items(items: &[NonPrescriptionItem]) -> Result<(), Error> {
    let mut errors = FieldErrors::new();
    if items.is_empty() {
        errors.insert("items", "Select at least one product");
    }

    for (index, item) in items.iter().enumerate() {
        if !(item.price >= 0.0) {
            errors.insert(format!("items[{index}].price"), "Price cannot be negative");
        }
        if !(item.weight > 0.0) {
            errors.insert(
                format!("items[{index}].weight"),
                "Weight must be greater than 0 g",
            );
        }
    }

    errors.into_result()
}
