use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Gender は住民の性別を表す。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Male" => Ok(Gender::Male),
            "Female" => Ok(Gender::Female),
            "Other" => Ok(Gender::Other),
            other => Err(format!("unknown gender: {}", other)),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CivilStatus は住民の婚姻状況を表す。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CivilStatus {
    Single,
    Married,
    Widowed,
    Divorced,
}

impl CivilStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CivilStatus::Single => "Single",
            CivilStatus::Married => "Married",
            CivilStatus::Widowed => "Widowed",
            CivilStatus::Divorced => "Divorced",
        }
    }
}

impl FromStr for CivilStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Single" => Ok(CivilStatus::Single),
            "Married" => Ok(CivilStatus::Married),
            "Widowed" => Ok(CivilStatus::Widowed),
            "Divorced" => Ok(CivilStatus::Divorced),
            other => Err(format!("unknown civil status: {}", other)),
        }
    }
}

impl fmt::Display for CivilStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// VotersStatus は有権者登録の有無を表す。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VotersStatus {
    Registered,
    #[serde(rename = "Not-Registered")]
    NotRegistered,
}

impl VotersStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            VotersStatus::Registered => "Registered",
            VotersStatus::NotRegistered => "Not-Registered",
        }
    }
}

impl FromStr for VotersStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Registered" => Ok(VotersStatus::Registered),
            "Not-Registered" => Ok(VotersStatus::NotRegistered),
            other => Err(format!("unknown voters status: {}", other)),
        }
    }
}

impl fmt::Display for VotersStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// NewResident は検証を通過した、まだ永続化されていない住民レコード。
/// 取り込み経路と単票登録経路の両方がこの形に変換してから保存する。
#[derive(Debug, Clone, PartialEq)]
pub struct NewResident {
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub alias: String,
    pub birthplace: String,
    pub birthdate: Option<NaiveDate>,
    pub age: i32,
    pub civil_status: CivilStatus,
    pub gender: Gender,
    pub purok: String,
    pub voters_status: VotersStatus,
    pub identified_as: String,
    pub email: String,
    pub contact_number: String,
    pub occupation: String,
    pub citizenship: String,
    pub household_no: String,
    pub address: String,
    pub precinct_no: String,
}

/// Resident は住民台帳に保存された住民を表すドメインエンティティ。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resident {
    pub id: Uuid,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub alias: String,
    pub birthplace: String,
    pub birthdate: Option<NaiveDate>,
    pub age: i32,
    pub civil_status: CivilStatus,
    pub gender: Gender,
    pub purok: String,
    pub voters_status: VotersStatus,
    pub identified_as: String,
    pub email: String,
    pub contact_number: String,
    pub occupation: String,
    pub citizenship: String,
    pub household_no: String,
    pub address: String,
    pub precinct_no: String,
    pub profile_image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Resident {
    /// 新しい ID と作成時刻を割り当てて Resident を生成する。
    pub fn new(record: NewResident) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            first_name: record.first_name,
            middle_name: record.middle_name,
            last_name: record.last_name,
            alias: record.alias,
            birthplace: record.birthplace,
            birthdate: record.birthdate,
            age: record.age,
            civil_status: record.civil_status,
            gender: record.gender,
            purok: record.purok,
            voters_status: record.voters_status,
            identified_as: record.identified_as,
            email: record.email,
            contact_number: record.contact_number,
            occupation: record.occupation,
            citizenship: record.citizenship,
            household_no: record.household_no,
            address: record.address,
            precinct_no: record.precinct_no,
            profile_image: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// 既存レコードの内容を置き換える。ID・作成時刻・プロフィール画像は維持される。
    pub fn apply(&mut self, record: NewResident) {
        self.first_name = record.first_name;
        self.middle_name = record.middle_name;
        self.last_name = record.last_name;
        self.alias = record.alias;
        self.birthplace = record.birthplace;
        self.birthdate = record.birthdate;
        self.age = record.age;
        self.civil_status = record.civil_status;
        self.gender = record.gender;
        self.purok = record.purok;
        self.voters_status = record.voters_status;
        self.identified_as = record.identified_as;
        self.email = record.email;
        self.contact_number = record.contact_number;
        self.occupation = record.occupation;
        self.citizenship = record.citizenship;
        self.household_no = record.household_no;
        self.address = record.address;
        self.precinct_no = record.precinct_no;
        self.updated_at = Utc::now();
    }
}

/// GenderCount は性別ごとの人数。
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GenderCount {
    pub male: i64,
    pub female: i64,
}

/// VotersCount は有権者登録状況ごとの人数。
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VotersCount {
    pub registered: i64,
    pub not_registered: i64,
}

/// PurokCount はプロク (地区) ごとの人数。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurokCount {
    #[serde(rename = "_id")]
    pub purok: String,
    pub count: i64,
}

/// ResidentStats は住民台帳の集計結果を表す。
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResidentStats {
    pub total: i64,
    pub gender: GenderCount,
    pub voters: VotersCount,
    pub purok: Vec<PurokCount>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> NewResident {
        NewResident {
            first_name: "Juan".to_string(),
            middle_name: "Santos".to_string(),
            last_name: "Dela Cruz".to_string(),
            alias: String::new(),
            birthplace: "Cebu City".to_string(),
            birthdate: NaiveDate::from_ymd_opt(1990, 5, 15),
            age: 34,
            civil_status: CivilStatus::Married,
            gender: Gender::Male,
            purok: "Purok 1".to_string(),
            voters_status: VotersStatus::Registered,
            identified_as: String::new(),
            email: "juan@example.com".to_string(),
            contact_number: "09171234567".to_string(),
            occupation: "Farmer".to_string(),
            citizenship: "Filipino".to_string(),
            household_no: "HH-001".to_string(),
            address: "123 Rizal St".to_string(),
            precinct_no: "0012A".to_string(),
        }
    }

    #[test]
    fn test_enum_parsing_is_case_sensitive() {
        assert_eq!("Male".parse::<Gender>(), Ok(Gender::Male));
        assert!("male".parse::<Gender>().is_err());
        assert_eq!(
            "Not-Registered".parse::<VotersStatus>(),
            Ok(VotersStatus::NotRegistered)
        );
        assert!("NotRegistered".parse::<VotersStatus>().is_err());
        assert_eq!("Widowed".parse::<CivilStatus>(), Ok(CivilStatus::Widowed));
    }

    #[test]
    fn test_new_resident_assigns_id_and_timestamps() {
        let resident = Resident::new(sample_record());
        assert_eq!(resident.first_name, "Juan");
        assert_eq!(resident.created_at, resident.updated_at);
        assert!(resident.profile_image.is_empty());
    }

    #[test]
    fn test_apply_keeps_identity() {
        let mut resident = Resident::new(sample_record());
        let id = resident.id;
        let created_at = resident.created_at;

        let mut record = sample_record();
        record.first_name = "Pedro".to_string();
        record.voters_status = VotersStatus::NotRegistered;
        resident.apply(record);

        assert_eq!(resident.id, id);
        assert_eq!(resident.created_at, created_at);
        assert_eq!(resident.first_name, "Pedro");
        assert_eq!(resident.voters_status, VotersStatus::NotRegistered);
    }

    #[test]
    fn test_resident_serializes_camel_case() {
        let resident = Resident::new(sample_record());
        let json = serde_json::to_value(&resident).unwrap();
        assert_eq!(json["firstName"], "Juan");
        assert_eq!(json["votersStatus"], "Registered");
        assert_eq!(json["birthdate"], "1990-05-15");
        assert_eq!(json["civilStatus"], "Married");
    }

    #[test]
    fn test_stats_serialization() {
        let stats = ResidentStats {
            total: 3,
            gender: GenderCount { male: 2, female: 1 },
            voters: VotersCount {
                registered: 1,
                not_registered: 2,
            },
            purok: vec![PurokCount {
                purok: "Purok 1".to_string(),
                count: 3,
            }],
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["voters"]["notRegistered"], 2);
        assert_eq!(json["purok"][0]["_id"], "Purok 1");
    }
}
