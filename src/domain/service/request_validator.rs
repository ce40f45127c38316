use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::domain::entity::request::{parse_incident_time, NewBlotterRequest, NewClearanceRequest};
use crate::domain::service::resident_validator::{field_errors, FieldError};

/// ClearanceRequestInput はクリアランス申請のリクエストボディ。
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct ClearanceRequestInput {
    #[validate(length(min = 1, message = "Full name is required"))]
    pub fullname: String,
    #[validate(length(min = 1, message = "Address is required"))]
    pub address: String,
    #[validate(length(min = 1, message = "Purpose is required"))]
    pub purpose: String,
    pub message: Option<String>,
}

impl ClearanceRequestInput {
    pub fn validate_into(self) -> Result<NewClearanceRequest, Vec<FieldError>> {
        let trimmed = Self {
            fullname: self.fullname.trim().to_string(),
            address: self.address.trim().to_string(),
            purpose: self.purpose.trim().to_string(),
            message: self
                .message
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty()),
        };
        trimmed.validate().map_err(|e| field_errors(&e))?;
        Ok(NewClearanceRequest {
            fullname: trimmed.fullname,
            address: trimmed.address,
            purpose: trimmed.purpose,
            message: trimmed.message,
        })
    }
}

/// BlotterRequestInput はブロッター申請のリクエストボディ。
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct BlotterRequestInput {
    #[validate(length(min = 1, message = "Complainant is required"))]
    pub complainant: String,
    #[validate(length(min = 1, message = "Respondent is required"))]
    pub respondent: String,
    #[validate(length(min = 1, message = "Complaint is required"))]
    pub complaint: String,
    #[validate(length(min = 1, message = "Incident type is required"))]
    pub incident_type: String,
    #[validate(custom(function = "validate_incident_time"))]
    pub date_time_incident: String,
}

fn validate_incident_time(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required")
            .with_message("Date and time of incident is required".into()));
    }
    parse_incident_time(value).map(|_| ()).ok_or_else(|| {
        ValidationError::new("date")
            .with_message("Date and time of incident must be a valid date".into())
    })
}

impl BlotterRequestInput {
    pub fn validate_into(self) -> Result<NewBlotterRequest, Vec<FieldError>> {
        let trimmed = Self {
            complainant: self.complainant.trim().to_string(),
            respondent: self.respondent.trim().to_string(),
            complaint: self.complaint.trim().to_string(),
            incident_type: self.incident_type.trim().to_string(),
            date_time_incident: self.date_time_incident,
        };
        trimmed.validate().map_err(|e| field_errors(&e))?;
        // 検証済みなので解釈に失敗することはない
        let date_time_incident =
            parse_incident_time(&trimmed.date_time_incident).ok_or_else(|| {
                vec![FieldError {
                    field: "dateTimeIncident".to_string(),
                    message: "Date and time of incident must be a valid date".to_string(),
                }]
            })?;
        Ok(NewBlotterRequest {
            complainant: trimmed.complainant,
            respondent: trimmed.respondent,
            complaint: trimmed.complaint,
            incident_type: trimmed.incident_type,
            date_time_incident,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clearance_requires_fields() {
        let errors = ClearanceRequestInput {
            fullname: "  ".to_string(),
            address: "12 Rizal St".to_string(),
            ..ClearanceRequestInput::default()
        }
        .validate_into()
        .unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["fullname", "purpose"]);
        assert_eq!(errors[0].message, "Full name is required");
    }

    #[test]
    fn test_clearance_blank_message_dropped() {
        let request = ClearanceRequestInput {
            fullname: "Juan Dela Cruz".to_string(),
            address: "12 Rizal St".to_string(),
            purpose: " Employment ".to_string(),
            message: Some("   ".to_string()),
        }
        .validate_into()
        .unwrap();
        assert_eq!(request.purpose, "Employment");
        assert_eq!(request.message, None);
    }

    fn blotter(date_time_incident: &str) -> BlotterRequestInput {
        BlotterRequestInput {
            complainant: "Maria".to_string(),
            respondent: "Pedro".to_string(),
            complaint: "Noise at night".to_string(),
            incident_type: "Disturbance".to_string(),
            date_time_incident: date_time_incident.to_string(),
        }
    }

    #[test]
    fn test_blotter_accepts_datetime_local() {
        let request = blotter("2024-03-09T21:30").validate_into().unwrap();
        assert_eq!(request.date_time_incident.to_rfc3339(), "2024-03-09T21:30:00+00:00");
    }

    #[test]
    fn test_blotter_incident_time_messages() {
        let errors = blotter("").validate_into().unwrap_err();
        assert_eq!(errors[0].field, "dateTimeIncident");
        assert_eq!(errors[0].message, "Date and time of incident is required");

        let errors = blotter("yesterday").validate_into().unwrap_err();
        assert_eq!(errors[0].message, "Date and time of incident must be a valid date");
    }

    #[test]
    fn test_blotter_reports_every_field() {
        let errors = BlotterRequestInput::default().validate_into().unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["complainant", "complaint", "dateTimeIncident", "incidentType", "respondent"]
        );
    }
}
