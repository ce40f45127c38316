use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entity::resident::{
    Gender, GenderCount, PurokCount, Resident, ResidentStats, VotersCount, VotersStatus,
};
use crate::domain::repository::ResidentRepository;

/// InMemoryResidentRepository はデータベース未設定時に使うインメモリ実装。
pub struct InMemoryResidentRepository {
    residents: RwLock<Vec<Resident>>,
}

impl InMemoryResidentRepository {
    pub fn new() -> Self {
        Self {
            residents: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryResidentRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn count_where(residents: &[Resident], pred: fn(&Resident) -> bool) -> i64 {
    i64::try_from(residents.iter().filter(|r| pred(r)).count()).unwrap_or(i64::MAX)
}

#[async_trait]
impl ResidentRepository for InMemoryResidentRepository {
    async fn create(&self, resident: &Resident) -> anyhow::Result<()> {
        let mut residents = self.residents.write().await;
        if residents.iter().any(|r| r.id == resident.id) {
            anyhow::bail!("resident already exists: {}", resident.id);
        }
        residents.push(resident.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Resident>> {
        let residents = self.residents.read().await;
        Ok(residents.iter().find(|r| r.id == id).cloned())
    }

    async fn find_all(&self) -> anyhow::Result<Vec<Resident>> {
        let mut all = self.residents.read().await.clone();
        // 挿入順を保ったまま新しい順に並べる
        all.reverse();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn update(&self, resident: &Resident) -> anyhow::Result<bool> {
        let mut residents = self.residents.write().await;
        match residents.iter_mut().find(|r| r.id == resident.id) {
            Some(existing) => {
                *existing = resident.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut residents = self.residents.write().await;
        let before = residents.len();
        residents.retain(|r| r.id != id);
        Ok(residents.len() < before)
    }

    async fn stats(&self) -> anyhow::Result<ResidentStats> {
        let residents = self.residents.read().await;
        let count = |pred: fn(&Resident) -> bool| count_where(&residents, pred);

        let mut purok: BTreeMap<&str, i64> = BTreeMap::new();
        for r in residents.iter() {
            *purok.entry(r.purok.as_str()).or_default() += 1;
        }

        Ok(ResidentStats {
            total: count(|_| true),
            gender: GenderCount {
                male: count(|r| r.gender == Gender::Male),
                female: count(|r| r.gender == Gender::Female),
            },
            voters: VotersCount {
                registered: count(|r| r.voters_status == VotersStatus::Registered),
                not_registered: count(|r| r.voters_status == VotersStatus::NotRegistered),
            },
            purok: purok
                .into_iter()
                .map(|(purok, count)| PurokCount {
                    purok: purok.to_string(),
                    count,
                })
                .collect(),
        })
    }
}
