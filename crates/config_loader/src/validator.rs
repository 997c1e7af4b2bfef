//! 配置校验模块
//!
//! 校验规则：
//! - 字段级约束 (derive): 名称非空、period_ms >= 1、queue_capacity >= 1
//! - sink 名称唯一
//! - file sink 必须提供 `path`
//! - network sink 的 `addr` 可解析、`format` 合法

use std::collections::HashSet;
use std::net::SocketAddr;

use ::validator::{Validate, ValidationErrors, ValidationErrorsKind};
use contracts::{ContractError, PublisherBlueprint, SinkConfig, SinkType};

/// 校验 PublisherBlueprint 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(blueprint: &PublisherBlueprint) -> Result<(), ContractError> {
    validate_fields(blueprint)?;
    validate_sink_names(blueprint)?;
    validate_sink_params(blueprint)?;
    Ok(())
}

/// 字段级约束 (validator derive)
fn validate_fields(blueprint: &PublisherBlueprint) -> Result<(), ContractError> {
    let Err(errors) = blueprint.validate() else {
        return Ok(());
    };

    let mut flat = Vec::new();
    flatten_errors("", &errors, &mut flat);
    flat.sort();

    let (field, message) = flat
        .into_iter()
        .next()
        .unwrap_or_else(|| ("blueprint".to_string(), errors.to_string()));
    Err(ContractError::config_validation(field, message))
}

fn flatten_errors(prefix: &str, errors: &ValidationErrors, out: &mut Vec<(String, String)>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    let message = error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| error.code.to_string());
                    out.push((path.clone(), message));
                }
            }
            ValidationErrorsKind::Struct(inner) => flatten_errors(&path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (idx, inner) in items {
                    flatten_errors(&format!("{path}[{idx}]"), inner, out);
                }
            }
        }
    }
}

/// 校验 sink 名称唯一性
fn validate_sink_names(blueprint: &PublisherBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for sink in &blueprint.sinks {
        if !seen.insert(sink.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("sinks[name={}]", sink.name),
                "duplicate sink name",
            ));
        }
    }
    Ok(())
}

/// 校验 sink 类型特定参数
fn validate_sink_params(blueprint: &PublisherBlueprint) -> Result<(), ContractError> {
    for sink in &blueprint.sinks {
        match sink.sink_type {
            SinkType::Log => {}
            SinkType::File => validate_file_params(sink)?,
            SinkType::Network => validate_network_params(sink)?,
        }
    }
    Ok(())
}

fn validate_file_params(sink: &SinkConfig) -> Result<(), ContractError> {
    let has_target = ["path", "dir"]
        .iter()
        .any(|key| sink.params.get(*key).is_some_and(|v| !v.is_empty()));

    if !has_target {
        return Err(ContractError::config_validation(
            format!("sinks[{}].params.path", sink.name),
            "file sink requires a 'path' or 'dir' parameter",
        ));
    }
    Ok(())
}

fn validate_network_params(sink: &SinkConfig) -> Result<(), ContractError> {
    let addr = sink.params.get("addr").ok_or_else(|| {
        ContractError::config_validation(
            format!("sinks[{}].params.addr", sink.name),
            "network sink requires an 'addr' parameter",
        )
    })?;

    addr.parse::<SocketAddr>().map_err(|e| {
        ContractError::config_validation(
            format!("sinks[{}].params.addr", sink.name),
            format!("invalid address '{addr}': {e}"),
        )
    })?;

    if let Some(format) = sink.params.get("format") {
        if !matches!(format.as_str(), "json" | "bincode") {
            return Err(ContractError::config_validation(
                format!("sinks[{}].params.format", sink.name),
                format!("unknown format '{format}', expected 'json' or 'bincode'"),
            ));
        }
    }
    Ok(())
}
