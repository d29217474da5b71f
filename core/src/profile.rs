//! Customer profile: the validated model input.
//!
//! RULE: Every categorical field is a closed enum. Free-form strings
//! only exist at the presentation boundary (FieldValue) and are parsed
//! into these types by the resolver before they reach a profile.
//!
//! Field names on the wire are the scoring service's names, so the
//! serde renames here are part of the gateway contract.

use crate::error::{ChurnError, ChurnResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Declares a closed string domain: the enum, its wire spelling,
/// Display and FromStr. The wire spelling is the only accepted input.
macro_rules! string_domain {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    _ => {
                        let allowed: Vec<&str> = $name::ALL.iter().map(|v| v.as_str()).collect();
                        Err(format!("'{s}' is not one of {allowed:?}"))
                    }
                }
            }
        }
    };
}

string_domain! {
    YesNo {
        Yes => "Yes",
        No  => "No",
    }
}

string_domain! {
    /// Governed by PhoneService.
    MultipleLines {
        Yes            => "Yes",
        No             => "No",
        NoPhoneService => "No phone service",
    }
}

string_domain! {
    InternetService {
        No         => "No",
        Dsl        => "DSL",
        FiberOptic => "Fiber optic",
    }
}

string_domain! {
    /// Value of any of the six internet add-ons. Governed by InternetService.
    AddOn {
        Yes               => "Yes",
        No                => "No",
        NoInternetService => "No internet service",
    }
}

string_domain! {
    Contract {
        MonthToMonth => "Month-to-month",
        OneYear      => "One year",
        TwoYear      => "Two year",
    }
}

string_domain! {
    PaymentMethod {
        ElectronicCheck => "Electronic check",
        MailedCheck     => "Mailed check",
        BankTransfer    => "Bank transfer (automatic)",
        CreditCard      => "Credit card (automatic)",
    }
}

string_domain! {
    /// Every editable profile field, spelled as the scoring service expects.
    ProfileField {
        MonthlyCharges   => "MonthlyCharges",
        Tenure           => "tenure",
        TotalCharges     => "TotalCharges",
        SeniorCitizen    => "SeniorCitizen",
        Partner          => "Partner",
        Dependents       => "Dependents",
        PhoneService     => "PhoneService",
        MultipleLines    => "MultipleLines",
        InternetService  => "InternetService",
        OnlineSecurity   => "OnlineSecurity",
        OnlineBackup     => "OnlineBackup",
        DeviceProtection => "DeviceProtection",
        TechSupport      => "TechSupport",
        StreamingTV      => "StreamingTV",
        StreamingMovies  => "StreamingMovies",
        Contract         => "Contract",
        PaperlessBilling => "PaperlessBilling",
        PaymentMethod    => "PaymentMethod",
    }
}

impl ProfileField {
    /// Add-ons disabled when InternetService is No, in form order.
    pub const INTERNET_ADD_ONS: [ProfileField; 6] = [
        ProfileField::OnlineSecurity,
        ProfileField::OnlineBackup,
        ProfileField::DeviceProtection,
        ProfileField::TechSupport,
        ProfileField::StreamingTV,
        ProfileField::StreamingMovies,
    ];
}

/// A loosely typed value as it arrives from the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Numeric view. Numeric text ("70", " 12 ") is accepted as well.
    pub fn as_number(&self, field: ProfileField) -> ChurnResult<f64> {
        match self {
            FieldValue::Number(n) => Ok(*n),
            FieldValue::Text(s) => s.trim().parse::<f64>().map_err(|_| {
                ChurnError::validation(field.as_str(), format!("'{s}' is not a number"))
            }),
        }
    }

    pub fn as_text(&self, field: ProfileField) -> ChurnResult<&str> {
        match self {
            FieldValue::Text(s) => Ok(s.as_str()),
            FieldValue::Number(n) => Err(ChurnError::validation(
                field.as_str(),
                format!("expected text, got number {n}"),
            )),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{n}"),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<u32> for FieldValue {
    fn from(n: u32) -> Self {
        FieldValue::Number(n as f64)
    }
}

/// The canonical customer record sent to the scoring service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerProfile {
    #[serde(rename = "MonthlyCharges")]
    pub monthly_charges:   f64,
    #[serde(rename = "tenure")]
    pub tenure:            u32,
    #[serde(rename = "TotalCharges")]
    pub total_charges:     f64,
    #[serde(rename = "SeniorCitizen", with = "senior_flag")]
    pub senior_citizen:    bool,
    #[serde(rename = "Partner")]
    pub partner:           YesNo,
    #[serde(rename = "Dependents")]
    pub dependents:        YesNo,
    #[serde(rename = "PhoneService")]
    pub phone_service:     YesNo,
    #[serde(rename = "MultipleLines")]
    pub multiple_lines:    MultipleLines,
    #[serde(rename = "InternetService")]
    pub internet_service:  InternetService,
    #[serde(rename = "OnlineSecurity")]
    pub online_security:   AddOn,
    #[serde(rename = "OnlineBackup")]
    pub online_backup:     AddOn,
    #[serde(rename = "DeviceProtection")]
    pub device_protection: AddOn,
    #[serde(rename = "TechSupport")]
    pub tech_support:      AddOn,
    #[serde(rename = "StreamingTV")]
    pub streaming_tv:      AddOn,
    #[serde(rename = "StreamingMovies")]
    pub streaming_movies:  AddOn,
    #[serde(rename = "Contract")]
    pub contract:          Contract,
    #[serde(rename = "PaperlessBilling")]
    pub paperless_billing: YesNo,
    #[serde(rename = "PaymentMethod")]
    pub payment_method:    PaymentMethod,
}

impl Default for CustomerProfile {
    /// The form's initial state at session start.
    fn default() -> Self {
        Self {
            monthly_charges:   70.0,
            tenure:            12,
            total_charges:     840.0,
            senior_citizen:    false,
            partner:           YesNo::No,
            dependents:        YesNo::No,
            phone_service:     YesNo::Yes,
            multiple_lines:    MultipleLines::No,
            internet_service:  InternetService::FiberOptic,
            online_security:   AddOn::No,
            online_backup:     AddOn::Yes,
            device_protection: AddOn::No,
            tech_support:      AddOn::No,
            streaming_tv:      AddOn::Yes,
            streaming_movies:  AddOn::Yes,
            contract:          Contract::MonthToMonth,
            paperless_billing: YesNo::Yes,
            payment_method:    PaymentMethod::ElectronicCheck,
        }
    }
}

impl CustomerProfile {
    /// The six add-ons paired with their field names, in form order.
    pub fn add_ons(&self) -> [(ProfileField, AddOn); 6] {
        [
            (ProfileField::OnlineSecurity,   self.online_security),
            (ProfileField::OnlineBackup,     self.online_backup),
            (ProfileField::DeviceProtection, self.device_protection),
            (ProfileField::TechSupport,      self.tech_support),
            (ProfileField::StreamingTV,      self.streaming_tv),
            (ProfileField::StreamingMovies,  self.streaming_movies),
        ]
    }

    pub fn add_ons_mut(&mut self) -> [&mut AddOn; 6] {
        [
            &mut self.online_security,
            &mut self.online_backup,
            &mut self.device_protection,
            &mut self.tech_support,
            &mut self.streaming_tv,
            &mut self.streaming_movies,
        ]
    }

    /// Mutable slot for one add-on, None for any other field.
    pub fn add_on_mut(&mut self, field: ProfileField) -> Option<&mut AddOn> {
        match field {
            ProfileField::OnlineSecurity   => Some(&mut self.online_security),
            ProfileField::OnlineBackup     => Some(&mut self.online_backup),
            ProfileField::DeviceProtection => Some(&mut self.device_protection),
            ProfileField::TechSupport      => Some(&mut self.tech_support),
            ProfileField::StreamingTV      => Some(&mut self.streaming_tv),
            ProfileField::StreamingMovies  => Some(&mut self.streaming_movies),
            _ => None,
        }
    }

    /// Current value of a field in presentation form.
    pub fn field_value(&self, field: ProfileField) -> FieldValue {
        use ProfileField as F;
        match field {
            F::MonthlyCharges   => FieldValue::Number(self.monthly_charges),
            F::Tenure           => FieldValue::Number(self.tenure as f64),
            F::TotalCharges     => FieldValue::Number(self.total_charges),
            F::SeniorCitizen    => FieldValue::Number(if self.senior_citizen { 1.0 } else { 0.0 }),
            F::Partner          => self.partner.as_str().into(),
            F::Dependents       => self.dependents.as_str().into(),
            F::PhoneService     => self.phone_service.as_str().into(),
            F::MultipleLines    => self.multiple_lines.as_str().into(),
            F::InternetService  => self.internet_service.as_str().into(),
            F::OnlineSecurity   => self.online_security.as_str().into(),
            F::OnlineBackup     => self.online_backup.as_str().into(),
            F::DeviceProtection => self.device_protection.as_str().into(),
            F::TechSupport      => self.tech_support.as_str().into(),
            F::StreamingTV      => self.streaming_tv.as_str().into(),
            F::StreamingMovies  => self.streaming_movies.as_str().into(),
            F::Contract         => self.contract.as_str().into(),
            F::PaperlessBilling => self.paperless_billing.as_str().into(),
            F::PaymentMethod    => self.payment_method.as_str().into(),
        }
    }

    /// Fields whose values differ between `self` and `other`, in field order.
    pub fn diff(&self, other: &CustomerProfile) -> Vec<ProfileField> {
        ProfileField::ALL
            .iter()
            .copied()
            .filter(|f| self.field_value(*f) != other.field_value(*f))
            .collect()
    }

    /// Check the two-way dependent-field invariant:
    ///   PhoneService == No     <=> MultipleLines == "No phone service"
    ///   InternetService == No  <=> every add-on == "No internet service"
    pub fn check_consistency(&self) -> ChurnResult<()> {
        let phone_off = self.phone_service == YesNo::No;
        let lines_na = self.multiple_lines == MultipleLines::NoPhoneService;
        if phone_off != lines_na {
            return Err(ChurnError::InvariantViolation(format!(
                "PhoneService={} but MultipleLines={}",
                self.phone_service, self.multiple_lines
            )));
        }

        let internet_off = self.internet_service == InternetService::No;
        for (field, value) in self.add_ons() {
            if internet_off != (value == AddOn::NoInternetService) {
                return Err(ChurnError::InvariantViolation(format!(
                    "InternetService={} but {field}={value}",
                    self.internet_service
                )));
            }
        }
        Ok(())
    }

    pub fn is_consistent(&self) -> bool {
        self.check_consistency().is_ok()
    }
}

/// SeniorCitizen travels as integer 0/1.
mod senior_flag {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        match u8::deserialize(deserializer)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(de::Error::custom(format!("SeniorCitizen must be 0 or 1, got {other}"))),
        }
    }
}
