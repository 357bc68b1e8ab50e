//! Vow records: the raw form, the insert payload and the stored row.
//!
//! A vow is immutable once the backend accepts it; nothing here models an
//! update or delete.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::UserId;

/// Name of the backend relation holding vows.
pub const VOWS_TABLE: &str = "vows";

/// The nine fields collected by the vow form, exactly as typed.
///
/// No field is validated locally. The default value is the cleared form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct VowForm {
    /// Given name.
    #[schema(example = "Ada")]
    pub first_name: String,
    /// Family name.
    #[schema(example = "Lovelace")]
    pub surname: String,
    /// Contact phone number.
    #[schema(example = "+2348012345678")]
    pub phone: String,
    /// Contact email.
    #[schema(example = "ada@example.com")]
    pub email: String,
    /// Pledged amount as typed; parsed leniently on submit.
    #[schema(example = "2500")]
    pub amount: String,
    /// Church chapter.
    #[schema(example = "Dominion City Lekki")]
    pub chapter: String,
    /// Country.
    #[schema(example = "Nigeria")]
    pub country: String,
    /// State or region.
    #[schema(example = "Lagos")]
    pub state: String,
    /// Purpose of the vow.
    #[schema(example = "Building fund")]
    pub purpose: String,
}

impl VowForm {
    /// Build the insert payload, attaching the owning user when signed in.
    ///
    /// # Examples
    /// ```
    /// use vows_backend::domain::VowForm;
    ///
    /// let form = VowForm { amount: "12.5".into(), ..VowForm::default() };
    /// let vow = form.to_new_vow(None);
    /// assert_eq!(vow.amount, 12.5);
    /// assert!(vow.user_id.is_none());
    /// ```
    pub fn to_new_vow(&self, owner: Option<UserId>) -> NewVow {
        NewVow {
            user_id: owner,
            first_name: self.first_name.clone(),
            surname: self.surname.clone(),
            phone: self.phone.clone(),
            email: self.email.clone(),
            amount: parse_amount(&self.amount),
            chapter: self.chapter.clone(),
            country: self.country.clone(),
            state: self.state.clone(),
            purpose: self.purpose.clone(),
        }
    }
}

/// Insert payload for the `vows` relation.
///
/// `amount` may be NaN when the form value was not numeric; JSON encodes it
/// as `null` and the backend decides what to do with it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewVow {
    /// Owning account, or `null` for anonymous submissions.
    pub user_id: Option<UserId>,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub surname: String,
    /// Contact phone number.
    pub phone: String,
    /// Contact email.
    pub email: String,
    /// Pledged amount.
    pub amount: f64,
    /// Church chapter.
    pub chapter: String,
    /// Country.
    pub country: String,
    /// State or region.
    pub state: String,
    /// Purpose of the vow.
    pub purpose: String,
}

/// Key column value as stored by whichever schema created the table.
///
/// The documented schema uses UUIDs; tables created by hand often carry a
/// serial `int8` key instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum RowKey {
    Uuid(Uuid),
    Integer(i64),
    Text(String),
}

/// A vow row as read back from the backend.
///
/// Every column is optional and keys are untyped so probes can decode rows
/// from partially provisioned or differently keyed tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct Vow {
    /// Storage-generated identifier.
    pub id: Option<RowKey>,
    /// Owning account, if the submitter was signed in.
    pub user_id: Option<RowKey>,
    /// Given name.
    pub first_name: Option<String>,
    /// Family name.
    pub surname: Option<String>,
    /// Contact phone number.
    pub phone: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Pledged amount.
    pub amount: Option<f64>,
    /// Church chapter.
    pub chapter: Option<String>,
    /// Country.
    pub country: Option<String>,
    /// State or region.
    pub state: Option<String>,
    /// Purpose of the vow.
    pub purpose: Option<String>,
    /// Server-assigned creation time.
    pub created_at: Option<DateTime<Utc>>,
}

/// Parse a typed amount the way a browser's `parseFloat` does.
///
/// Leading whitespace is skipped and the longest decimal prefix is used, so
/// `"12abc"` yields `12.0`. Input without a numeric prefix yields NaN.
///
/// # Examples
/// ```
/// use vows_backend::domain::parse_amount;
///
/// assert_eq!(parse_amount("  42.5kg"), 42.5);
/// assert_eq!(parse_amount("1e3"), 1000.0);
/// assert!(parse_amount("forty").is_nan());
/// ```
pub fn parse_amount(raw: &str) -> f64 {
    let trimmed = raw.trim_start_matches(|c: char| c.is_whitespace() || c == '\u{feff}');
    let prefix = numeric_prefix(trimmed);
    if prefix.is_empty() {
        return f64::NAN;
    }
    prefix.parse().unwrap_or(f64::NAN)
}

fn numeric_prefix(input: &str) -> &str {
    let bytes = input.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }

    let unsigned = input.get(end..).unwrap_or_default();
    if unsigned.starts_with("Infinity") {
        return input.get(..end + "Infinity".len()).unwrap_or_default();
    }

    let int_digits = count_digits(bytes, end);
    end += int_digits;
    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(bytes, end + 1);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return "";
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = count_digits(bytes, exp_end);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    input.get(..end).unwrap_or_default()
}

fn count_digits(bytes: &[u8], start: usize) -> usize {
    bytes
        .get(start..)
        .map_or(0, |rest| rest.iter().take_while(|b| b.is_ascii_digit()).count())
}
