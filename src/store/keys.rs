use crate::store::StoreError;

/// 分析记录主键即分析 ID；拒绝空值和 ':'，避免与元数据键前缀冲突
pub fn analysis_key(analysis_id: &str) -> Result<String, StoreError> {
    if analysis_id.is_empty() || analysis_id.len() > 64 || analysis_id.contains(':') {
        return Err(StoreError::Validation(format!(
            "invalid analysis id: {analysis_id:?}"
        )));
    }
    Ok(analysis_id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analysis_key_is_the_id() {
        let id = "3f2b7c1e-0a4d-4b8e-9c61-5d7f2e8a9b10";
        assert_eq!(analysis_key(id).unwrap(), id);
    }

    #[test]
    fn analysis_key_rejects_separator_and_empty() {
        assert!(matches!(analysis_key(""), Err(StoreError::Validation(_))));
        assert!(matches!(analysis_key("_meta:version"), Err(StoreError::Validation(_))));
        assert!(analysis_key(&"a".repeat(65)).is_err());
    }
}
