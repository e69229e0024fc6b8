//! The CnC command interpreter (§4.5): the action table mapping a parsed
//! [`CncCommand`] to a [`crate::controller::Controller`] operation, and the
//! reply envelopes each action produces.

use serde_json::{Value, json};

use crate::cnc::CncRequest;
use crate::controller::Controller;
use crate::domain::Category;
use crate::error::CncError;

/// Dispatch one request to completion: send the ack, run the action, send
/// the terminal completion envelope.
///
/// Returns whether the config document was mutated as a side effect, so a
/// caller processing a batch of commands can schedule exactly one coalesced
/// write after the whole batch settles (§4.6) rather than one per command.
pub async fn dispatch(request: CncRequest, controller: &Controller) -> bool {
    request.ack();
    match run(&request, controller).await {
        Ok(Outcome { response, config_mutated }) => {
            request.complete_ok(response);
            config_mutated
        }
        Err(err) => {
            request.complete_error(&err.to_string());
            false
        }
    }
}

/// What a successful action produced: the payload to echo back as the
/// completion `response`, and whether it touched the config document.
struct Outcome {
    response: Value,
    config_mutated: bool,
}

impl Outcome {
    fn value(response: Value) -> Self {
        Self { response, config_mutated: false }
    }

    fn mutation() -> Self {
        Self { response: json!({}), config_mutated: true }
    }
}

fn category_of(request: &CncRequest) -> Result<Category, CncError> {
    let raw = request
        .command()
        .category
        .as_deref()
        .ok_or(CncError::MissingArgument("category"))?;
    Category::parse(raw).map_err(CncError::InvalidCategory)
}

fn id_of(request: &CncRequest) -> Result<&str, CncError> {
    request
        .command()
        .id
        .as_deref()
        .ok_or(CncError::MissingArgument("id"))
}

async fn run(request: &CncRequest, controller: &Controller) -> Result<Outcome, CncError> {
    let command = request.command();
    let request_id = request.request_id();
    match command.action.as_str() {
        "stop_connector" => {
            let category = category_of(request)?;
            let id = id_of(request)?;
            let response = controller.stop_connector(category, id, request_id).await?;
            Ok(Outcome::value(response))
        }
        "start_connector" => {
            let category = category_of(request)?;
            let id = id_of(request)?;
            let response = controller.start_connector(category, id, request_id).await?;
            Ok(Outcome::value(response))
        }
        "restart_connector" => {
            let category = category_of(request)?;
            let id = id_of(request)?;
            let response = controller.restart_connector(category, id, request_id).await?;
            Ok(Outcome::value(response))
        }
        "stop_all_connectors" => {
            let category = optional_category(request)?;
            let results = controller.stop_all(category, request_id).await;
            Ok(Outcome::value(results_to_json(&results)))
        }
        "start_all_connectors" => {
            let category = optional_category(request)?;
            let results = controller.start_all(category, request_id).await;
            Ok(Outcome::value(results_to_json(&results)))
        }
        "restart_all_connectors" => {
            let category = optional_category(request)?;
            let results = controller.restart_all(category, request_id).await;
            Ok(Outcome::value(results_to_json(&results)))
        }
        "list_connectors" => {
            let category = optional_category(request)?;
            Ok(Outcome::value(controller.list_connectors(category)))
        }
        "get_connector_config" => {
            let category = category_of(request)?;
            let id = request.command().id.as_deref();
            let config = controller.get_connector_config(category, id).ok_or_else(|| {
                CncError::NoSuchConnector { category: category.tag(), id: id.unwrap_or("").to_string() }
            })?;
            Ok(Outcome::value(config))
        }
        "send_data" => {
            let category = category_of(request)?;
            let id = id_of(request)?;
            let data = command.data.clone().unwrap_or(Value::Null);
            controller.send_data(category, id, data, request_id)?;
            Ok(Outcome::value(json!({})))
        }
        "update_config" => {
            let category = category_of(request)?;
            let id = id_of(request)?;
            let entry = command.config.clone().ok_or(CncError::MissingArgument("config"))?;
            controller.update_config(category, id, entry)?;
            Ok(Outcome::mutation())
        }
        "delete_config" => {
            let category = category_of(request)?;
            let id = id_of(request)?;
            controller.delete_config(category, id)?;
            Ok(Outcome::mutation())
        }
        "update_connector_type" => {
            let connector_type = command
                .r#type
                .clone()
                .ok_or(CncError::MissingArgument("type"))?;
            let module_path = command
                .module_path
                .clone()
                .ok_or(CncError::MissingArgument("modulePath"))?;
            controller.update_connector_type(connector_type, module_path)?;
            Ok(Outcome::mutation())
        }
        "maintenance_action" => {
            let payload = command.maintenance_command.clone().unwrap_or(Value::Null);
            controller.request_maintenance(payload, request_id).await;
            Ok(Outcome::value(json!({})))
        }
        other => Err(CncError::UnknownAction(other.to_string())),
    }
}

/// `category` is optional for the `*_all_connectors` actions: absent means
/// "both categories" (§4.5), so this only raises `InvalidCategory` when a
/// category *is* given and isn't recognized.
fn optional_category(request: &CncRequest) -> Result<Option<Category>, CncError> {
    match request.command().category.as_deref() {
        None => Ok(None),
        Some(raw) => Category::parse(raw).map(Some).map_err(CncError::InvalidCategory),
    }
}

fn results_to_json(results: &[(String, Result<Value, crate::error::PipelineError>)]) -> Value {
    let mut succeeded = Vec::new();
    let mut failed = serde_json::Map::new();
    for (id, result) in results {
        match result {
            Ok(_) => succeeded.push(Value::String(id.clone())),
            Err(err) => {
                failed.insert(id.clone(), Value::String(err.to_string()));
            }
        }
    }
    json!({ "succeeded": succeeded, "failed": failed })
}
