use std::str::FromStr;

use assist_api::domain::conversation::{ConversationTurn, Role};
use assist_db::models::ConversationTurnModel;
use heapless::String as HeaplessString;

pub struct ConversationMapper;

impl ConversationMapper {
    pub fn turn_to_model(turn: ConversationTurn) -> Result<ConversationTurnModel, String> {
        Ok(ConversationTurnModel {
            session_id: turn.session_id,
            role: HeaplessString::from_str(role_str(turn.role)).map_err(|_| "role too long".to_string())?,
            content: turn.content,
            timestamp: turn.timestamp,
        })
    }

    pub fn turn_from_model(model: ConversationTurnModel) -> Result<ConversationTurn, String> {
        Ok(ConversationTurn {
            session_id: model.session_id,
            role: role_from_str(model.role.as_str())?,
            content: model.content,
            timestamp: model.timestamp,
        })
    }
}

fn role_str(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

fn role_from_str(s: &str) -> Result<Role, String> {
    match s {
        "user" => Ok(Role::User),
        "assistant" => Ok(Role::Assistant),
        other => Err(format!("unknown role '{other}'")),
    }
}
