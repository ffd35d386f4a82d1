//! 评分标准 TOML 加载器
//!
//! 老师以 TOML 文件编写评分标准，启动时加载

use std::path::Path;

use anyhow::{Context, Result};
use tokio::fs;

use crate::models::rubric::Rubric;

/// 从 TOML 文件加载评分标准
pub async fn load_rubric_from_toml(path: &Path) -> Result<Rubric> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("无法读取评分标准文件: {}", path.display()))?;

    let rubric: Rubric = toml::from_str(&content)
        .with_context(|| format!("无法解析评分标准文件: {}", path.display()))?;

    tracing::info!(
        "成功加载评分标准: {} (共 {} 题, 总分 {})",
        rubric.exam_name,
        rubric.questions.len(),
        rubric.total_marks
    );

    Ok(rubric)
}

/// 尝试加载评分标准，文件不存在时返回 None
pub async fn try_load_rubric(path: &Path) -> Result<Option<Rubric>> {
    if !path.exists() {
        tracing::warn!("评分标准文件不存在: {}", path.display());
        return Ok(None);
    }
    Ok(Some(load_rubric_from_toml(path).await?))
}
