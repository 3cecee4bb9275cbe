use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisResult;
use crate::store::keys;
use crate::store::{Store, StoreError};

/// 持久化的一次分析：结果本身加上请求元数据
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredAnalysis {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub landmark_count: usize,
    pub result: AnalysisResult,
}

impl Store {
    /// 写入新记录；ID 已存在时返回 `Conflict`，不会覆盖
    pub fn insert_analysis(&self, record: &StoredAnalysis) -> Result<(), StoreError> {
        let key = keys::analysis_key(&record.id)?;
        let bytes = Self::serialize(record)?;

        let cas_result = self
            .analyses
            .compare_and_swap(key.as_bytes(), None::<&[u8]>, Some(bytes))?;

        if cas_result.is_err() {
            return Err(StoreError::Conflict {
                entity: "analysis".to_string(),
                key: record.id.clone(),
            });
        }
        Ok(())
    }

    pub fn get_analysis(&self, analysis_id: &str) -> Result<Option<StoredAnalysis>, StoreError> {
        let key = keys::analysis_key(analysis_id)?;
        match self.analyses.get(key.as_bytes())? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn require_analysis(&self, analysis_id: &str) -> Result<StoredAnalysis, StoreError> {
        self.get_analysis(analysis_id)?
            .ok_or_else(|| StoreError::NotFound {
                entity: "analysis".to_string(),
                key: analysis_id.to_string(),
            })
    }

    pub fn count_analyses(&self) -> usize {
        self.analyses.len()
    }
}
