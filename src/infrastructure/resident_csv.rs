use std::io;

use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};

use crate::domain::entity::import::{parse_leading_int, ImportRow, DEFAULT_CITIZENSHIP};
use crate::domain::entity::resident::Resident;

/// ResidentColumn は住民 CSV の列契約。
/// 各列は人間向けの見出し (取り込み・出力の両方で使う) と camelCase の代替名を持つ。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResidentColumn {
    FirstName,
    MiddleName,
    LastName,
    Alias,
    Birthplace,
    Birthdate,
    Age,
    CivilStatus,
    Gender,
    Purok,
    VotersStatus,
    IdentifiedAs,
    Email,
    ContactNumber,
    Occupation,
    Citizenship,
    HouseholdNo,
    Address,
    PrecinctNo,
}

impl ResidentColumn {
    /// 契約順の全列。出力 CSV の列順もこれに従う。
    pub const ALL: [ResidentColumn; 19] = [
        ResidentColumn::FirstName,
        ResidentColumn::MiddleName,
        ResidentColumn::LastName,
        ResidentColumn::Alias,
        ResidentColumn::Birthplace,
        ResidentColumn::Birthdate,
        ResidentColumn::Age,
        ResidentColumn::CivilStatus,
        ResidentColumn::Gender,
        ResidentColumn::Purok,
        ResidentColumn::VotersStatus,
        ResidentColumn::IdentifiedAs,
        ResidentColumn::Email,
        ResidentColumn::ContactNumber,
        ResidentColumn::Occupation,
        ResidentColumn::Citizenship,
        ResidentColumn::HouseholdNo,
        ResidentColumn::Address,
        ResidentColumn::PrecinctNo,
    ];

    pub fn header(self) -> &'static str {
        match self {
            ResidentColumn::FirstName => "First Name",
            ResidentColumn::MiddleName => "Middle Name",
            ResidentColumn::LastName => "Last Name",
            ResidentColumn::Alias => "Alias",
            ResidentColumn::Birthplace => "Birthplace",
            ResidentColumn::Birthdate => "Birthdate",
            ResidentColumn::Age => "Age",
            ResidentColumn::CivilStatus => "Civil Status",
            ResidentColumn::Gender => "Gender",
            ResidentColumn::Purok => "Purok",
            ResidentColumn::VotersStatus => "Voters Status",
            ResidentColumn::IdentifiedAs => "Identified As",
            ResidentColumn::Email => "Email",
            ResidentColumn::ContactNumber => "Contact Number",
            ResidentColumn::Occupation => "Occupation",
            ResidentColumn::Citizenship => "Citizenship",
            ResidentColumn::HouseholdNo => "Household No",
            ResidentColumn::Address => "Address",
            ResidentColumn::PrecinctNo => "Precinct No",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            ResidentColumn::FirstName => "firstName",
            ResidentColumn::MiddleName => "middleName",
            ResidentColumn::LastName => "lastName",
            ResidentColumn::Alias => "alias",
            ResidentColumn::Birthplace => "birthplace",
            ResidentColumn::Birthdate => "birthdate",
            ResidentColumn::Age => "age",
            ResidentColumn::CivilStatus => "civilStatus",
            ResidentColumn::Gender => "gender",
            ResidentColumn::Purok => "purok",
            ResidentColumn::VotersStatus => "votersStatus",
            ResidentColumn::IdentifiedAs => "identifiedAs",
            ResidentColumn::Email => "email",
            ResidentColumn::ContactNumber => "contactNumber",
            ResidentColumn::Occupation => "occupation",
            ResidentColumn::Citizenship => "citizenship",
            ResidentColumn::HouseholdNo => "householdNo",
            ResidentColumn::Address => "address",
            ResidentColumn::PrecinctNo => "precinctNo",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct ColumnSlot {
    header: Option<usize>,
    key: Option<usize>,
}

/// ColumnMap は見出し行から各列の位置を一度だけ解決した結果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    slots: [ColumnSlot; 19],
}

impl ColumnMap {
    pub fn resolve(headers: &StringRecord) -> Self {
        let position = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}').trim() == name)
        };
        let mut slots = [ColumnSlot::default(); 19];
        for (slot, column) in slots.iter_mut().zip(ResidentColumn::ALL) {
            *slot = ColumnSlot {
                header: position(column.header()),
                key: position(column.key()),
            };
        }
        Self { slots }
    }

    /// 見出し列の値が空でなければそれを、そうでなければ camelCase 列の値を返す。
    /// どちらも無い・空の場合は空文字列。
    pub fn value<'r>(&self, record: &'r StringRecord, column: ResidentColumn) -> &'r str {
        let slot = self.slots[column as usize];
        let cell = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i))
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };
        cell(slot.header).or_else(|| cell(slot.key)).unwrap_or("")
    }

    /// 1 レコードを ImportRow に変換する。
    pub fn row(&self, record: &StringRecord) -> ImportRow {
        let text = |column| self.value(record, column).to_string();
        let citizenship = match self.value(record, ResidentColumn::Citizenship) {
            "" => DEFAULT_CITIZENSHIP.to_string(),
            v => v.to_string(),
        };
        ImportRow {
            first_name: text(ResidentColumn::FirstName),
            middle_name: text(ResidentColumn::MiddleName),
            last_name: text(ResidentColumn::LastName),
            alias: text(ResidentColumn::Alias),
            birthplace: text(ResidentColumn::Birthplace),
            birthdate: text(ResidentColumn::Birthdate),
            age: parse_leading_int(self.value(record, ResidentColumn::Age)),
            civil_status: text(ResidentColumn::CivilStatus),
            gender: text(ResidentColumn::Gender),
            purok: text(ResidentColumn::Purok),
            voters_status: text(ResidentColumn::VotersStatus),
            identified_as: text(ResidentColumn::IdentifiedAs),
            email: text(ResidentColumn::Email),
            contact_number: text(ResidentColumn::ContactNumber),
            occupation: text(ResidentColumn::Occupation),
            citizenship,
            household_no: text(ResidentColumn::HouseholdNo),
            address: text(ResidentColumn::Address),
            precinct_no: text(ResidentColumn::PrecinctNo),
        }
    }
}

/// ResidentCsvReader は CSV を 1 行ずつ ImportRow として読み出す。
pub struct ResidentCsvReader<R> {
    reader: csv::Reader<R>,
    columns: ColumnMap,
}

impl<R: io::Read> ResidentCsvReader<R> {
    /// 見出し行を解決してリーダーを作る。
    pub fn from_reader(rdr: R) -> Result<Self, csv::Error> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(rdr);
        let columns = ColumnMap::resolve(reader.headers()?);
        Ok(Self { reader, columns })
    }

    /// ファイル順に行を返すイテレータへ変換する。読み直しはできない。
    pub fn into_rows(self) -> impl Iterator<Item = Result<ImportRow, csv::Error>> {
        let columns = self.columns;
        self.reader
            .into_records()
            .map(move |record| record.map(|r| columns.row(&r)))
    }
}

/// 住民一覧を列契約どおりの CSV (見出し行付き) に書き出す。
pub fn write_residents(residents: &[Resident]) -> anyhow::Result<Vec<u8>> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(ResidentColumn::ALL.iter().map(|c| c.header()))?;
    for resident in residents {
        let birthdate = resident
            .birthdate
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        let age = resident.age.to_string();
        writer.write_record([
            resident.first_name.as_str(),
            resident.middle_name.as_str(),
            resident.last_name.as_str(),
            resident.alias.as_str(),
            resident.birthplace.as_str(),
            birthdate.as_str(),
            age.as_str(),
            resident.civil_status.as_str(),
            resident.gender.as_str(),
            resident.purok.as_str(),
            resident.voters_status.as_str(),
            resident.identified_as.as_str(),
            resident.email.as_str(),
            resident.contact_number.as_str(),
            resident.occupation.as_str(),
            resident.citizenship.as_str(),
            resident.household_no.as_str(),
            resident.address.as_str(),
            resident.precinct_no.as_str(),
        ])?;
    }
    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("failed to flush csv writer: {}", e))
}
