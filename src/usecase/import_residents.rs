use std::path::Path;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::domain::entity::import::{ImportError, ImportRow, ImportSummary, RowOutcome};
use crate::domain::entity::resident::Resident;
use crate::domain::repository::ResidentRepository;
use crate::domain::service::import_validator::ImportValidator;
use crate::infrastructure::resident_csv::ResidentCsvReader;
use crate::infrastructure::upload_store::StoredUpload;

/// ImportResidentsError は取り込み全体を中断するエラー。
/// 行単位の検証・保存エラーはここには含まれず、ImportSummary に記録される。
#[derive(Debug, thiserror::Error)]
pub enum ImportResidentsError {
    /// CSV の読み取りに失敗した。partial には中断前に処理した行の集計が入る。
    #[error("{cause}")]
    Stream {
        cause: String,
        partial: ImportSummary,
    },
}

/// ImportResidentsUseCase は CSV ファイルから住民を一括登録するユースケース。
///
/// 行はファイル順に 1 件ずつ検証・保存される。ある行の失敗は後続の行に影響せず、
/// 既に保存された行はロールバックされない。
pub struct ImportResidentsUseCase {
    resident_repo: Arc<dyn ResidentRepository>,
}

impl ImportResidentsUseCase {
    pub fn new(resident_repo: Arc<dyn ResidentRepository>) -> Self {
        Self { resident_repo }
    }

    /// 保存済みアップロードを取り込む。アップロードファイルは結果に関わらず削除される。
    pub async fn execute(
        &self,
        upload: StoredUpload,
    ) -> Result<ImportSummary, ImportResidentsError> {
        let result = self.import_file(upload.path()).await;
        upload.discard();

        match &result {
            Ok(summary) => info!(
                total_processed = summary.total_processed,
                success_count = summary.success_count,
                error_count = summary.error_count,
                "resident csv import completed"
            ),
            Err(ImportResidentsError::Stream { cause, partial }) => error!(
                error = %cause,
                total_processed = partial.total_processed,
                success_count = partial.success_count,
                "resident csv import aborted"
            ),
        }
        result
    }

    async fn import_file(&self, path: &Path) -> Result<ImportSummary, ImportResidentsError> {
        let abort = |cause: String| ImportResidentsError::Stream {
            cause,
            partial: ImportSummary::default(),
        };
        // アップロードはサイズ上限内なのでメモリに載せてから解析する
        let bytes = tokio::fs::read(path).await.map_err(|e| abort(e.to_string()))?;
        let reader =
            ResidentCsvReader::from_reader(bytes.as_slice()).map_err(|e| abort(e.to_string()))?;

        let mut summary = ImportSummary::default();
        for row in reader.into_rows() {
            let row = match row {
                Ok(row) => row,
                Err(e) => {
                    return Err(ImportResidentsError::Stream {
                        cause: e.to_string(),
                        partial: summary,
                    })
                }
            };
            let outcome = self.import_row(row).await;
            summary = summary.record(outcome);
        }
        Ok(summary)
    }

    async fn import_row(&self, row: ImportRow) -> RowOutcome {
        let record = match ImportValidator::validate(&row) {
            Ok(record) => record,
            Err(rejection) => {
                warn!(reason = %rejection, "csv row rejected");
                return RowOutcome::Failed(ImportError {
                    data: row,
                    error: rejection.to_string(),
                });
            }
        };

        let resident = Resident::new(record);
        match self.resident_repo.create(&resident).await {
            Ok(()) => RowOutcome::Imported,
            Err(e) => {
                warn!(error = %e, "failed to save csv row");
                RowOutcome::Failed(ImportError {
                    data: row,
                    error: e.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repository::resident_repository::MockResidentRepository;
    use crate::infrastructure::upload_store::UploadStore;
    use mockall::Sequence;

    const HEADER: &str =
        "First Name,Last Name,Birthdate,Age,Gender,Civil Status,Voters Status,Purok\n";

    async fn upload(dir: &tempfile::TempDir, body: impl Into<Vec<u8>>) -> StoredUpload {
        UploadStore::new(dir.path()).store(body.into()).await.unwrap()
    }

    #[tokio::test]
    async fn test_two_valid_rows_are_saved() {
        let dir = tempfile::tempdir().unwrap();
        let mut mock = MockResidentRepository::new();
        mock.expect_create().times(2).returning(|_| Ok(()));

        let csv = format!(
            "{HEADER}Juan,Dela Cruz,1990-05-15,34,Male,Single,Registered,Purok 1\n\
             Maria,Santos,1985-01-20,39,Female,Married,Not-Registered,Purok 2\n"
        );
        let uc = ImportResidentsUseCase::new(Arc::new(mock));
        let summary = uc.execute(upload(&dir, csv).await).await.unwrap();

        assert_eq!(summary.total_processed, 2);
        assert_eq!(summary.success_count, 2);
        assert_eq!(summary.error_count, 0);
        assert!(summary.errors.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_gender_row_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut mock = MockResidentRepository::new();
        mock.expect_create().never();

        let csv = format!("{HEADER}Juan,Dela Cruz,1990-05-15,34,InvalidGender,Single,Registered,Purok 1\n");
        let uc = ImportResidentsUseCase::new(Arc::new(mock));
        let summary = uc.execute(upload(&dir, csv).await).await.unwrap();

        assert_eq!(summary.success_count, 0);
        assert_eq!(summary.error_count, 1);
        assert_eq!(
            summary.errors[0].error,
            "Invalid gender value. Must be Male, Female, or Other"
        );
        assert_eq!(summary.errors[0].data.first_name, "Juan");
        assert_eq!(summary.errors[0].data.gender, "InvalidGender");
    }

    #[tokio::test]
    async fn test_store_failure_does_not_stop_later_rows() {
        let dir = tempfile::tempdir().unwrap();
        let mut mock = MockResidentRepository::new();
        let mut seq = Sequence::new();
        mock.expect_create()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        mock.expect_create()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(anyhow::anyhow!("connection reset by peer")));
        mock.expect_create()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        let csv = format!(
            "{HEADER}A,One,,1,Male,Single,Registered,P1\n\
             B,Two,,2,Female,Single,Registered,P1\n\
             C,Three,,3,Other,Single,Registered,P1\n"
        );
        let uc = ImportResidentsUseCase::new(Arc::new(mock));
        let summary = uc.execute(upload(&dir, csv).await).await.unwrap();

        assert_eq!(summary.total_processed, 3);
        assert_eq!(summary.success_count, 2);
        assert_eq!(summary.error_count, 1);
        assert_eq!(summary.errors[0].error, "connection reset by peer");
        assert_eq!(summary.errors[0].data.first_name, "B");
    }

    #[tokio::test]
    async fn test_errors_follow_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut mock = MockResidentRepository::new();
        mock.expect_create().times(1).returning(|_| Ok(()));

        let csv = format!(
            "{HEADER},NoFirst,,1,Male,Single,Registered,P1\n\
             Ok,Row,,1,Male,Single,Registered,P1\n\
             Bad,Civil,,1,Male,Complicated,Registered,P1\n\
             Bad,Voter,,1,Male,Single,Maybe,P1\n"
        );
        let uc = ImportResidentsUseCase::new(Arc::new(mock));
        let summary = uc.execute(upload(&dir, csv).await).await.unwrap();

        let reasons: Vec<&str> = summary.errors.iter().map(|e| e.error.as_str()).collect();
        assert_eq!(
            reasons,
            vec![
                "First name and last name are required",
                "Invalid civil status. Must be Single, Married, Widowed, or Divorced",
                "Invalid voters status. Must be Registered or Not-Registered",
            ]
        );
        assert_eq!(summary.total_processed, 4);
    }

    #[tokio::test]
    async fn test_unparseable_birthdate_still_imports() {
        let dir = tempfile::tempdir().unwrap();
        let mut mock = MockResidentRepository::new();
        mock.expect_create()
            .withf(|r: &Resident| r.birthdate.is_none() && r.first_name == "Juan")
            .times(1)
            .returning(|_| Ok(()));

        let csv = format!("{HEADER}Juan,Dela Cruz,01/01/2000,24,Male,Single,Registered,P1\n");
        let uc = ImportResidentsUseCase::new(Arc::new(mock));
        let summary = uc.execute(upload(&dir, csv).await).await.unwrap();
        assert_eq!(summary.success_count, 1);
    }

    #[tokio::test]
    async fn test_header_only_file() {
        let dir = tempfile::tempdir().unwrap();
        let mock = MockResidentRepository::new();

        let uc = ImportResidentsUseCase::new(Arc::new(mock));
        let summary = uc.execute(upload(&dir, HEADER).await).await.unwrap();
        assert_eq!(summary, ImportSummary::default());
    }

    #[tokio::test]
    async fn test_stream_error_aborts_with_partial_counts() {
        let dir = tempfile::tempdir().unwrap();
        let mut mock = MockResidentRepository::new();
        mock.expect_create().times(1).returning(|_| Ok(()));

        let mut csv = format!("{HEADER}Juan,Dela Cruz,,34,Male,Single,Registered,P1\n").into_bytes();
        csv.extend_from_slice(b"\xff\xfe,\xff,,1,Male,Single,Registered,P1\n");
        csv.extend_from_slice(b"Never,Reached,,1,Male,Single,Registered,P1\n");

        let uc = ImportResidentsUseCase::new(Arc::new(mock));
        let err = uc.execute(upload(&dir, csv).await).await.unwrap_err();

        let ImportResidentsError::Stream { partial, .. } = err;
        assert_eq!(partial.total_processed, 1);
        assert_eq!(partial.success_count, 1);
    }

    #[tokio::test]
    async fn test_unreadable_upload_aborts_before_any_row() {
        let dir = tempfile::tempdir().unwrap();
        let mut mock = MockResidentRepository::new();
        mock.expect_create().never();

        let stored = upload(&dir, format!("{HEADER}A,B,,1,Male,Single,Registered,P1\n")).await;
        std::fs::remove_file(stored.path()).unwrap();

        let uc = ImportResidentsUseCase::new(Arc::new(mock));
        let ImportResidentsError::Stream { partial, .. } = uc.execute(stored).await.unwrap_err();
        assert_eq!(partial, ImportSummary::default());
    }

    #[tokio::test]
    async fn test_upload_file_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        let mut mock = MockResidentRepository::new();
        mock.expect_create().returning(|_| Ok(()));

        let stored = upload(&dir, format!("{HEADER}A,B,,1,Male,Single,Registered,P1\n")).await;
        let path = stored.path().to_path_buf();

        let uc = ImportResidentsUseCase::new(Arc::new(mock));
        uc.execute(stored).await.unwrap();
        assert!(!path.exists());
    }
}
