use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// RequestStatus は住民から提出された申請の審査状態。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Denied,
}

impl RequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Denied => "denied",
        }
    }
}

impl FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RequestStatus::Pending),
            "approved" => Ok(RequestStatus::Approved),
            "denied" => Ok(RequestStatus::Denied),
            other => Err(format!("unknown request status: {}", other)),
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// RequestRecord は審査対象となる申請に共通する操作。
pub trait RequestRecord: Clone + fmt::Debug + Serialize + Send + Sync + 'static {
    fn id(&self) -> Uuid;
    /// 申請を提出したユーザー。
    fn user_id(&self) -> Uuid;
    fn created_at(&self) -> DateTime<Utc>;
    fn set_status(&mut self, status: RequestStatus, at: DateTime<Utc>);
}

/// ClearanceRequest はバランガイ・クリアランス（証明書）の発行申請。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearanceRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub fullname: String,
    pub address: String,
    pub purpose: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewClearanceRequest {
    pub fullname: String,
    pub address: String,
    pub purpose: String,
    pub message: Option<String>,
}

impl ClearanceRequest {
    pub fn new(user_id: Uuid, request: NewClearanceRequest) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            fullname: request.fullname,
            address: request.address,
            purpose: request.purpose,
            message: request.message,
            status: RequestStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}

impl RequestRecord for ClearanceRequest {
    fn id(&self) -> Uuid {
        self.id
    }

    fn user_id(&self) -> Uuid {
        self.user_id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn set_status(&mut self, status: RequestStatus, at: DateTime<Utc>) {
        self.status = status;
        self.updated_at = at;
    }
}

/// BlotterRequest は住民間のトラブルを記録するブロッター（事件簿）への登録申請。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlotterRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub complainant: String,
    pub respondent: String,
    pub complaint: String,
    pub incident_type: String,
    pub status: RequestStatus,
    pub date_time_reported: DateTime<Utc>,
    pub date_time_incident: DateTime<Utc>,
    pub date_recorded: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewBlotterRequest {
    pub complainant: String,
    pub respondent: String,
    pub complaint: String,
    pub incident_type: String,
    pub date_time_incident: DateTime<Utc>,
}

impl BlotterRequest {
    /// 受付日時と記録日時は提出時刻になる。
    pub fn new(user_id: Uuid, request: NewBlotterRequest) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            complainant: request.complainant,
            respondent: request.respondent,
            complaint: request.complaint,
            incident_type: request.incident_type,
            status: RequestStatus::Pending,
            date_time_reported: now,
            date_time_incident: request.date_time_incident,
            date_recorded: now,
            created_at: now,
            updated_at: now,
        }
    }
}

impl RequestRecord for BlotterRequest {
    fn id(&self) -> Uuid {
        self.id
    }

    fn user_id(&self) -> Uuid {
        self.user_id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn set_status(&mut self, status: RequestStatus, at: DateTime<Utc>) {
        self.status = status;
        self.updated_at = at;
    }
}

/// 事件発生日時を解釈する。RFC 3339 か、ブラウザの datetime-local 形式
/// (`YYYY-MM-DDTHH:MM[:SS]`) を受け付け、後者は UTC とみなす。
pub fn parse_incident_time(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
}
