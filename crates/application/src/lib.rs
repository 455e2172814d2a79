//! 应用层：作业注册表与分析编排
//!
//! 注册表在进程启动时创建一次，以 `Arc` 句柄传给所有协作者；
//! 编排器为每次提交启动一个独立的后台任务驱动作业状态机。

pub mod services;

pub use services::*;
