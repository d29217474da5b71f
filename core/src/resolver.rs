//! Field dependency resolver: validates one edit and normalises the
//! fields that depend on it.
//!
//! RULE: This module is pure. apply() never mutates its input; the
//! caller decides whether the returned profile becomes the new state.
//!
//! Governing fields and their dependents:
//!   PhoneService    -> MultipleLines               (sentinel "No phone service")
//!   InternetService -> the six INTERNET_ADD_ONS    (sentinel "No internet service")
//!
//! Switching a governing field to No forces every dependent to the
//! sentinel, discarding whatever was there. Switching it away from No
//! resets only dependents that hold the sentinel, to No.

use crate::{
    error::{ChurnError, ChurnResult},
    profile::{
        AddOn, CustomerProfile, FieldValue, InternetService, MultipleLines, ProfileField, YesNo,
    },
};
use std::str::FromStr;

/// Apply one edit. Returns the new profile, or Validation if the value
/// is outside the field's domain or would break the dependent-field rule.
pub fn apply(
    profile: &CustomerProfile,
    field: ProfileField,
    value: &FieldValue,
) -> ChurnResult<CustomerProfile> {
    use ProfileField as F;

    let mut next = profile.clone();

    match field {
        F::MonthlyCharges => next.monthly_charges = parse_charge(field, value)?,
        F::TotalCharges   => next.total_charges = parse_charge(field, value)?,
        F::Tenure         => next.tenure = parse_tenure(value)?,
        F::SeniorCitizen  => next.senior_citizen = parse_senior(value)?,

        F::Partner          => next.partner = parse_text(field, value)?,
        F::Dependents       => next.dependents = parse_text(field, value)?,
        F::PaperlessBilling => next.paperless_billing = parse_text(field, value)?,
        F::Contract         => next.contract = parse_text(field, value)?,
        F::PaymentMethod    => next.payment_method = parse_text(field, value)?,

        F::PhoneService => {
            next.phone_service = parse_text(field, value)?;
            normalize_phone(&mut next);
        }
        F::InternetService => {
            next.internet_service = parse_text(field, value)?;
            normalize_internet(&mut next);
        }

        F::MultipleLines => {
            let lines: MultipleLines = parse_text(field, value)?;
            let phone_off = next.phone_service == YesNo::No;
            if phone_off != (lines == MultipleLines::NoPhoneService) {
                return Err(ChurnError::validation(
                    field.as_str(),
                    format!("'{lines}' is not allowed while PhoneService is {}", next.phone_service),
                ));
            }
            next.multiple_lines = lines;
        }

        add_on => {
            let choice: AddOn = parse_text(add_on, value)?;
            let internet_off = next.internet_service == InternetService::No;
            if internet_off != (choice == AddOn::NoInternetService) {
                return Err(ChurnError::validation(
                    add_on.as_str(),
                    format!(
                        "'{choice}' is not allowed while InternetService is {}",
                        next.internet_service
                    ),
                ));
            }
            if let Some(slot) = next.add_on_mut(add_on) {
                *slot = choice;
            }
        }
    }

    next.check_consistency()?;
    Ok(next)
}

/// Re-derive every dependent field from its governing field.
/// Used for profiles that did not arrive through apply(), e.g. a file.
pub fn normalize(profile: &CustomerProfile) -> CustomerProfile {
    let mut next = profile.clone();
    normalize_phone(&mut next);
    normalize_internet(&mut next);
    next
}

fn normalize_phone(profile: &mut CustomerProfile) {
    match profile.phone_service {
        YesNo::No => profile.multiple_lines = MultipleLines::NoPhoneService,
        YesNo::Yes => {
            if profile.multiple_lines == MultipleLines::NoPhoneService {
                profile.multiple_lines = MultipleLines::No;
            }
        }
    }
}

fn normalize_internet(profile: &mut CustomerProfile) {
    let internet_off = profile.internet_service == InternetService::No;
    for slot in profile.add_ons_mut() {
        if internet_off {
            *slot = AddOn::NoInternetService;
        } else if *slot == AddOn::NoInternetService {
            *slot = AddOn::No;
        }
    }
}

fn parse_text<T>(field: ProfileField, value: &FieldValue) -> ChurnResult<T>
where
    T: FromStr<Err = String>,
{
    value
        .as_text(field)?
        .parse::<T>()
        .map_err(|reason| ChurnError::validation(field.as_str(), reason))
}

fn parse_charge(field: ProfileField, value: &FieldValue) -> ChurnResult<f64> {
    let amount = value.as_number(field)?;
    if !amount.is_finite() || amount < 0.0 {
        return Err(ChurnError::validation(
            field.as_str(),
            format!("{amount} must be a finite amount >= 0"),
        ));
    }
    Ok(amount)
}

fn parse_tenure(value: &FieldValue) -> ChurnResult<u32> {
    let field = ProfileField::Tenure;
    let months = value.as_number(field)?;
    if !months.is_finite() || months < 0.0 || months.fract() != 0.0 || months > u32::MAX as f64 {
        return Err(ChurnError::validation(
            field.as_str(),
            format!("{months} must be a whole number of months >= 0"),
        ));
    }
    Ok(months as u32)
}

/// Accepts 0/1 (numeric or text) and Yes/No.
fn parse_senior(value: &FieldValue) -> ChurnResult<bool> {
    let field = ProfileField::SeniorCitizen;
    match value {
        FieldValue::Number(n) if *n == 0.0 => Ok(false),
        FieldValue::Number(n) if *n == 1.0 => Ok(true),
        FieldValue::Text(s) => match s.trim() {
            "0" | "No" => Ok(false),
            "1" | "Yes" => Ok(true),
            other => Err(ChurnError::validation(
                field.as_str(),
                format!("'{other}' must be 0, 1, Yes or No"),
            )),
        },
        FieldValue::Number(n) => Err(ChurnError::validation(
            field.as_str(),
            format!("{n} must be 0 or 1"),
        )),
    }
}
