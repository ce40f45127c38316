use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;

pub const DEFAULT_CITIZENSHIP: &str = "Filipino";

/// ImportRow は CSV の 1 行を列契約に従ってマッピングした一時的な値。
/// 値はすべて生の文字列のまま保持し、型付けは検証時に行う。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRow {
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub alias: String,
    pub birthplace: String,
    pub birthdate: String,
    pub age: i32,
    pub civil_status: String,
    pub gender: String,
    pub purok: String,
    pub voters_status: String,
    pub identified_as: String,
    pub email: String,
    pub contact_number: String,
    pub occupation: String,
    pub citizenship: String,
    pub household_no: String,
    pub address: String,
    pub precinct_no: String,
}

impl Default for ImportRow {
    fn default() -> Self {
        Self {
            first_name: String::new(),
            middle_name: String::new(),
            last_name: String::new(),
            alias: String::new(),
            birthplace: String::new(),
            birthdate: String::new(),
            age: 0,
            civil_status: String::new(),
            gender: String::new(),
            purok: String::new(),
            voters_status: String::new(),
            identified_as: String::new(),
            email: String::new(),
            contact_number: String::new(),
            occupation: String::new(),
            citizenship: DEFAULT_CITIZENSHIP.to_string(),
            household_no: String::new(),
            address: String::new(),
            precinct_no: String::new(),
        }
    }
}

/// 生年月日文字列を日付に変換する。解釈できない場合は None を返す (行は拒否しない)。
/// 受け付ける形式: `YYYY-MM-DD`、RFC 3339、`YYYY-MM-DDTHH:MM:SS`。
pub fn parse_birthdate(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|dt| dt.date())
}

/// 先頭の整数部分だけを読み取る。数字が続かない場合は 0。
/// "42 years" は 42、"abc" は 0 になる。
pub fn parse_leading_int(raw: &str) -> i32 {
    let raw = raw.trim_start();
    let (sign, digits) = match raw.as_bytes().first() {
        Some(b'-') => (-1, &raw[1..]),
        Some(b'+') => (1, &raw[1..]),
        _ => (1, raw),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end]
        .parse::<i32>()
        .map(|n| sign * n)
        .unwrap_or(0)
}

/// ImportError は取り込みに失敗した 1 行の記録。元の行データと理由を保持する。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportError {
    pub data: ImportRow,
    pub error: String,
}

/// RowOutcome は 1 行分の処理結果。
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Imported,
    Failed(ImportError),
}

/// ImportSummary は 1 回の取り込みの集計。行ごとに record で新しい値を作り直す。
/// total_processed == success_count + error_count が常に成り立つ。
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub total_processed: usize,
    pub success_count: usize,
    pub error_count: usize,
    pub errors: Vec<ImportError>,
}

impl ImportSummary {
    #[must_use]
    pub fn record(mut self, outcome: RowOutcome) -> Self {
        self.total_processed += 1;
        match outcome {
            RowOutcome::Imported => self.success_count += 1,
            RowOutcome::Failed(err) => {
                self.error_count += 1;
                self.errors.push(err);
            }
        }
        self
    }

    pub fn message(&self) -> String {
        format!(
            "CSV import completed. {} records imported successfully, {} failed.",
            self.success_count, self.error_count
        )
    }
}
