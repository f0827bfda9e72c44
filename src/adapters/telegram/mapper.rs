//! Map Bot API JSON types to domain entities, and keyboards back to `reply_markup`.
//!
//! Only the fields the bot reads are modelled; serde ignores the rest.

use crate::domain::{
    CallbackQuery, ChatMessage, IncomingUpdate, Keyboard, Sender, UpdateEnvelope,
};
use serde::Deserialize;
use serde_json::{Value, json};

/// Envelope of every Bot API response.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
    pub error_code: Option<u16>,
    pub parameters: Option<ResponseParameters>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseParameters {
    pub retry_after: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct ApiUpdate {
    pub update_id: i64,
    pub message: Option<ApiMessage>,
    pub callback_query: Option<ApiCallbackQuery>,
}

#[derive(Debug, Deserialize)]
pub struct ApiMessage {
    pub message_id: i64,
    pub date: i64,
    pub chat: ApiChat,
    pub from: Option<ApiUser>,
    pub text: Option<String>,
    pub caption: Option<String>,
    pub photo: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
pub struct ApiChat {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct ApiUser {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub first_name: String,
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiCallbackQuery {
    pub id: String,
    pub from: ApiUser,
    pub message: Option<ApiMessage>,
    pub data: Option<String>,
}

fn sender_from(user: ApiUser) -> Sender {
    Sender {
        id: user.id,
        username: user.username.filter(|u| !u.is_empty()),
        first_name: user.first_name,
    }
}

/// Map a Bot API message. Messages without an author (channel posts) or sent
/// by bots are dropped.
pub fn message_to_domain(msg: ApiMessage) -> Option<ChatMessage> {
    let from = msg.from?;
    if from.is_bot {
        return None;
    }
    let has_photo = msg.photo.as_ref().is_some_and(|p| !p.is_empty());
    let text = msg.text.or(msg.caption).unwrap_or_default();
    Some(ChatMessage {
        message_id: msg.message_id,
        chat_id: msg.chat.id,
        sender: sender_from(from),
        text,
        date: msg.date,
        has_photo,
    })
}

pub fn callback_to_domain(cb: ApiCallbackQuery) -> CallbackQuery {
    CallbackQuery {
        id: cb.id,
        chat_id: cb.message.map(|m| m.chat.id),
        sender: sender_from(cb.from),
        data: cb.data.unwrap_or_default(),
    }
}

/// Map one update. Kinds the bot does not handle (edits, channel posts, bot
/// messages) map to `update: None` so the offset still moves past them.
pub fn update_to_domain(update: ApiUpdate) -> UpdateEnvelope {
    let inner = if let Some(cb) = update.callback_query {
        Some(IncomingUpdate::Callback(callback_to_domain(cb)))
    } else {
        update
            .message
            .and_then(message_to_domain)
            .map(IncomingUpdate::Message)
    };
    UpdateEnvelope {
        update_id: update.update_id,
        update: inner,
    }
}

/// `reply_markup` JSON for a keyboard.
pub fn keyboard_to_markup(keyboard: &Keyboard) -> Value {
    match keyboard {
        Keyboard::Reply(rows) => json!({
            "keyboard": rows
                .iter()
                .map(|row| row.iter().map(|text| json!({ "text": text })).collect::<Vec<_>>())
                .collect::<Vec<_>>(),
            "resize_keyboard": true,
        }),
        Keyboard::Inline(rows) => json!({
            "inline_keyboard": rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|b| json!({ "text": b.text, "callback_data": b.callback_data }))
                        .collect::<Vec<_>>()
                })
                .collect::<Vec<_>>(),
        }),
    }
}
