// ==========================================
// 订单工序排程系统 - 排程策略定义
// ==========================================
// 用途：
// - ForwardPipeline: 按小时正向流水线模拟（交期评估/CSV 导出基于此策略）
// - BackwardPerOperation: 自末道工序起从交期向前逐道"尽量晚"排程

use serde::{Deserialize, Serialize};

/// 排程策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStrategy {
    #[default]
    ForwardPipeline,
    BackwardPerOperation,
}

impl ScheduleStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleStrategy::ForwardPipeline => "forward_pipeline",
            ScheduleStrategy::BackwardPerOperation => "backward_per_operation",
        }
    }
}

impl std::str::FromStr for ScheduleStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "forward_pipeline" | "forward-pipeline" | "forward" => Ok(ScheduleStrategy::ForwardPipeline),
            "backward_per_operation" | "backward-per-operation" | "backward" => {
                Ok(ScheduleStrategy::BackwardPerOperation)
            }
            other => Err(format!("未知策略类型: {}", other)),
        }
    }
}
