//! Manual food entry: a text-held draft that is finalized on submit.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::error::{EntryError, FieldError};
use crate::models::{ManualFoodRecord, Vitamin, VitaminUnit};

pub const SUCCESS_MESSAGE: &str = "Food entry submitted successfully!";

/// Scalar fields of the entry form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoodField {
    Name,
    Calories,
    Protein,
    Carbs,
    Fat,
}

impl FoodField {
    pub const MACROS: [FoodField; 4] = [
        FoodField::Calories,
        FoodField::Protein,
        FoodField::Carbs,
        FoodField::Fat,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FoodField::Name => "name",
            FoodField::Calories => "calories",
            FoodField::Protein => "protein",
            FoodField::Carbs => "carbs",
            FoodField::Fat => "fat",
        }
    }
}

impl fmt::Display for FoodField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FoodField {
    type Err = EntryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(FoodField::Name),
            "calories" => Ok(FoodField::Calories),
            "protein" => Ok(FoodField::Protein),
            "carbs" => Ok(FoodField::Carbs),
            "fat" => Ok(FoodField::Fat),
            other => Err(EntryError::UnknownField(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VitaminField {
    Name,
    Amount,
    Unit,
}

impl FromStr for VitaminField {
    type Err = EntryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(VitaminField::Name),
            "amount" => Ok(VitaminField::Amount),
            "unit" => Ok(VitaminField::Unit),
            other => Err(EntryError::UnknownField(other.to_string())),
        }
    }
}

/// One micronutrient row as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VitaminDraft {
    pub name: String,
    pub amount: String,
    pub unit: VitaminUnit,
}

/// The in-progress record. Numbers stay as text until submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FoodDraft {
    pub name: String,
    pub calories: String,
    pub protein: String,
    pub carbs: String,
    pub fat: String,
    pub vitamins: Vec<VitaminDraft>,
}

impl FoodDraft {
    pub fn field(&self, field: FoodField) -> &str {
        match field {
            FoodField::Name => &self.name,
            FoodField::Calories => &self.calories,
            FoodField::Protein => &self.protein,
            FoodField::Carbs => &self.carbs,
            FoodField::Fat => &self.fat,
        }
    }

    fn field_mut(&mut self, field: FoodField) -> &mut String {
        match field {
            FoodField::Name => &mut self.name,
            FoodField::Calories => &mut self.calories,
            FoodField::Protein => &mut self.protein,
            FoodField::Carbs => &mut self.carbs,
            FoodField::Fat => &mut self.fat,
        }
    }

    /// Validate every field and produce the finalized record.
    ///
    /// All invalid fields are reported together.
    pub fn finalize(&self) -> Result<ManualFoodRecord, EntryError> {
        let mut errors = Vec::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.push(FieldError::new("name", "is required"));
        }

        let mut macros = [0.0; 4];
        for (slot, field) in macros.iter_mut().zip(FoodField::MACROS) {
            match parse_required_number(self.field(field)) {
                Ok(v) => *slot = v,
                Err(message) => errors.push(FieldError::new(field.as_str(), message)),
            }
        }

        let mut vitamins = Vec::with_capacity(self.vitamins.len());
        for (i, row) in self.vitamins.iter().enumerate() {
            let vit_name = row.name.trim();
            if vit_name.is_empty() {
                errors.push(FieldError::new(format!("vitamins[{i}].name"), "is required"));
            }
            match parse_required_number(&row.amount) {
                Ok(amount) => vitamins.push(Vitamin {
                    name: vit_name.to_string(),
                    amount,
                    unit: row.unit,
                }),
                Err(message) => {
                    errors.push(FieldError::new(format!("vitamins[{i}].amount"), message))
                }
            }
        }

        if !errors.is_empty() {
            return Err(EntryError::Validation(errors));
        }

        let [calories, protein, carbs, fat] = macros;
        Ok(ManualFoodRecord {
            name: name.to_string(),
            calories,
            protein,
            carbs,
            fat,
            vitamins,
        })
    }
}

/// A successfully finalized entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub record: ManualFoodRecord,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct ManualEntryController {
    draft: FoodDraft,
    submitted: bool,
}

impl ManualEntryController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &FoodDraft {
        &self.draft
    }

    pub fn set_field(&mut self, field: FoodField, value: impl Into<String>) {
        *self.draft.field_mut(field) = value.into();
    }

    /// Append an empty `mg` row and return its index.
    pub fn add_vitamin_row(&mut self) -> usize {
        self.draft.vitamins.push(VitaminDraft::default());
        self.draft.vitamins.len() - 1
    }

    pub fn set_vitamin_field(
        &mut self,
        index: usize,
        field: VitaminField,
        value: &str,
    ) -> Result<(), EntryError> {
        let len = self.draft.vitamins.len();
        let row = self
            .draft
            .vitamins
            .get_mut(index)
            .ok_or(EntryError::VitaminIndex { index, len })?;
        match field {
            VitaminField::Name => row.name = value.to_string(),
            VitaminField::Amount => row.amount = value.to_string(),
            VitaminField::Unit => row.unit = value.parse()?,
        }
        Ok(())
    }

    pub fn remove_vitamin_row(&mut self, index: usize) -> Result<VitaminDraft, EntryError> {
        let len = self.draft.vitamins.len();
        if index >= len {
            return Err(EntryError::VitaminIndex { index, len });
        }
        Ok(self.draft.vitamins.remove(index))
    }

    /// Finalize the draft. The draft itself is left as is.
    pub fn submit(&mut self) -> Result<Submission, EntryError> {
        match self.draft.finalize() {
            Ok(record) => {
                info!(record = ?record, "food entry submitted");
                self.submitted = true;
                Ok(Submission {
                    record,
                    submitted_at: Utc::now(),
                })
            }
            Err(e) => {
                debug!(error = %e, "food entry rejected");
                self.submitted = false;
                Err(e)
            }
        }
    }

    /// Whether the last submission succeeded.
    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    pub fn success_message(&self) -> Option<&'static str> {
        self.submitted.then_some(SUCCESS_MESSAGE)
    }
}

fn parse_required_number(raw: &str) -> Result<f64, &'static str> {
    if raw.trim().is_empty() {
        return Err("is required");
    }
    let value = parse_number(raw);
    if value.is_finite() {
        Ok(value)
    } else {
        Err("must be a number")
    }
}

/// Parse the leading numeric prefix of `raw`, like JavaScript's `parseFloat`.
///
/// Returns NaN when no prefix is numeric: `"12abc"` is 12, `"abc"` is NaN.
pub fn parse_number(raw: &str) -> f64 {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let mut i = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }
    if s[i..].starts_with("Infinity") {
        return if bytes[0] == b'-' {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        digits += i - frac_start;
    }
    if digits == 0 {
        return f64::NAN;
    }

    let mut end = i;
    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        let mut j = i + 1;
        if j < bytes.len() && matches!(bytes[j], b'+' | b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            end = j;
        }
    }

    s[..end].parse().unwrap_or(f64::NAN)
}
