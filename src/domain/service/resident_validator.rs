use heck::ToLowerCamelCase;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidateEmail, ValidationError, ValidationErrors};

use crate::domain::entity::import::{parse_birthdate, DEFAULT_CITIZENSHIP};
use crate::domain::entity::resident::{CivilStatus, Gender, NewResident, VotersStatus};

/// ResidentInput は単票登録・更新 API のリクエストボディ。
/// CSV 取り込みより厳格に検証される。
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct ResidentInput {
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    pub middle_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    pub alias: String,
    #[validate(length(min = 1, message = "Birthplace is required"))]
    pub birthplace: String,
    #[validate(custom(function = "validate_birthdate"))]
    pub birthdate: String,
    #[validate(
        required(message = "Age is required"),
        range(min = 0, message = "Age must be zero or greater")
    )]
    pub age: Option<i32>,
    #[validate(custom(function = "validate_civil_status"))]
    pub civil_status: String,
    #[validate(custom(function = "validate_gender"))]
    pub gender: String,
    #[validate(length(min = 1, message = "Purok is required"))]
    pub purok: String,
    #[validate(custom(function = "validate_voters_status"))]
    pub voters_status: String,
    pub identified_as: String,
    #[validate(custom(function = "validate_optional_email"))]
    pub email: String,
    #[validate(custom(function = "validate_contact_number"))]
    pub contact_number: String,
    pub occupation: String,
    pub citizenship: String,
    pub household_no: String,
    #[validate(length(min = 1, message = "Address is required"))]
    pub address: String,
    pub precinct_no: String,
}

/// FieldError は 1 フィールド分の検証エラー。field は JSON 上のキー名。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

fn rule_error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(message.into())
}

fn validate_birthdate(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(rule_error("required", "Birthdate is required"));
    }
    parse_birthdate(value)
        .map(|_| ())
        .ok_or_else(|| rule_error("date", "Birthdate must be a valid ISO 8601 date"))
}

fn validate_gender(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<Gender>()
        .map(|_| ())
        .map_err(|_| rule_error("gender", "Gender must be Male, Female, or Other"))
}

fn validate_civil_status(value: &str) -> Result<(), ValidationError> {
    value.parse::<CivilStatus>().map(|_| ()).map_err(|_| {
        rule_error(
            "civil_status",
            "Civil status must be Single, Married, Widowed, or Divorced",
        )
    })
}

fn validate_voters_status(value: &str) -> Result<(), ValidationError> {
    value.parse::<VotersStatus>().map(|_| ()).map_err(|_| {
        rule_error(
            "voters_status",
            "Voters status must be Registered or Not-Registered",
        )
    })
}

fn validate_optional_email(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || value.validate_email() {
        Ok(())
    } else {
        Err(rule_error("email", "Email must be a valid email address"))
    }
}

/// 数字・空白・`+ - ( )` のみを許可する。
fn validate_contact_number(value: &str) -> Result<(), ValidationError> {
    let allowed = |c: char| c.is_ascii_digit() || c.is_whitespace() || "+-()".contains(c);
    if value.chars().all(allowed) {
        Ok(())
    } else {
        Err(rule_error(
            "contact_number",
            "Contact number may only contain digits, spaces, +, -, ( and )",
        ))
    }
}

/// validator のエラーをフィールド名順の FieldError 一覧に変換する。
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            let field = field.as_ref().to_lower_camel_case();
            errs.iter().map(move |e| FieldError {
                field: field.clone(),
                message: e
                    .message
                    .as_ref()
                    .map_or_else(|| e.code.to_string(), ToString::to_string),
            })
        })
        .collect();
    out.sort_by(|a, b| a.field.cmp(&b.field));
    out
}

/// ResidentValidator は単票登録・更新の厳格な検証を行うドメインサービス。
pub struct ResidentValidator;

impl ResidentValidator {
    pub fn validate(input: ResidentInput) -> Result<NewResident, Vec<FieldError>> {
        input.validate().map_err(|e| field_errors(&e))?;

        let invalid = |field: &str, message: &str| {
            vec![FieldError {
                field: field.to_string(),
                message: message.to_string(),
            }]
        };
        let gender = input
            .gender
            .parse::<Gender>()
            .map_err(|e| invalid("gender", e.as_str()))?;
        let civil_status = input
            .civil_status
            .parse::<CivilStatus>()
            .map_err(|e| invalid("civilStatus", e.as_str()))?;
        let voters_status = input
            .voters_status
            .parse::<VotersStatus>()
            .map_err(|e| invalid("votersStatus", e.as_str()))?;
        let birthdate = parse_birthdate(&input.birthdate)
            .ok_or_else(|| invalid("birthdate", "Birthdate must be a valid ISO 8601 date"))?;
        let citizenship = if input.citizenship.is_empty() {
            DEFAULT_CITIZENSHIP.to_string()
        } else {
            input.citizenship
        };

        Ok(NewResident {
            first_name: input.first_name,
            middle_name: input.middle_name,
            last_name: input.last_name,
            alias: input.alias,
            birthplace: input.birthplace,
            birthdate: Some(birthdate),
            age: input.age.unwrap_or_default(),
            civil_status,
            gender,
            purok: input.purok,
            voters_status,
            identified_as: input.identified_as,
            email: input.email,
            contact_number: input.contact_number,
            occupation: input.occupation,
            citizenship,
            household_no: input.household_no,
            address: input.address,
            precinct_no: input.precinct_no,
        })
    }
}
