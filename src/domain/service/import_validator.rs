use crate::domain::entity::import::{parse_birthdate, ImportRow};
use crate::domain::entity::resident::{CivilStatus, Gender, NewResident, VotersStatus};

/// ImportRejection は取り込み行を拒否した理由。Display がそのままレスポンスの error になる。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImportRejection {
    #[error("First name and last name are required")]
    MissingName,

    #[error("Invalid gender value. Must be Male, Female, or Other")]
    InvalidGender,

    #[error("Invalid civil status. Must be Single, Married, Widowed, or Divorced")]
    InvalidCivilStatus,

    #[error("Invalid voters status. Must be Registered or Not-Registered")]
    InvalidVotersStatus,
}

/// ImportValidator は CSV 取り込み行の検証を行うドメインサービス。
///
/// 検査は次の順で行い、最初に失敗したものだけを報告する。
///
/// 1. 名・姓が空でない
/// 2. 性別が Male / Female / Other
/// 3. 婚姻状況が Single / Married / Widowed / Divorced
/// 4. 有権者登録が Registered / Not-Registered
///
/// メールアドレス・電話番号・年齢・住所はここでは検査しない。
/// 生年月日は解釈できなければ None として受け入れる。
pub struct ImportValidator;

impl ImportValidator {
    pub fn validate(row: &ImportRow) -> Result<NewResident, ImportRejection> {
        if row.first_name.is_empty() || row.last_name.is_empty() {
            return Err(ImportRejection::MissingName);
        }
        let gender: Gender = row
            .gender
            .parse()
            .map_err(|_| ImportRejection::InvalidGender)?;
        let civil_status: CivilStatus = row
            .civil_status
            .parse()
            .map_err(|_| ImportRejection::InvalidCivilStatus)?;
        let voters_status: VotersStatus = row
            .voters_status
            .parse()
            .map_err(|_| ImportRejection::InvalidVotersStatus)?;

        Ok(NewResident {
            first_name: row.first_name.clone(),
            middle_name: row.middle_name.clone(),
            last_name: row.last_name.clone(),
            alias: row.alias.clone(),
            birthplace: row.birthplace.clone(),
            birthdate: parse_birthdate(&row.birthdate),
            age: row.age,
            civil_status,
            gender,
            purok: row.purok.clone(),
            voters_status,
            identified_as: row.identified_as.clone(),
            email: row.email.clone(),
            contact_number: row.contact_number.clone(),
            occupation: row.occupation.clone(),
            citizenship: row.citizenship.clone(),
            household_no: row.household_no.clone(),
            address: row.address.clone(),
            precinct_no: row.precinct_no.clone(),
        })
    }
}
