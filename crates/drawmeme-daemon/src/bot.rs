//! Chat-bot replies.
//!
//! Renders the text and inline keyboards of the bot menus from registry
//! reads. Delivering them to a chat is up to whatever bot transport calls
//! the `bot_*` RPC methods.

use drawmeme_db::Registry;
use drawmeme_types::{Token, UserUpdate};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::DaemonConfig;

/// A message for the bot to send.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotReply {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<ParseMode>,
    /// Rows of inline buttons.
    #[serde(default)]
    pub keyboard: Vec<Vec<Button>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseMode {
    #[serde(rename = "HTML")]
    Html,
}

/// An inline keyboard button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub text: String,
    #[serde(flatten)]
    pub action: ButtonAction,
}

/// What pressing a button does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonAction {
    /// Open the drawing web app.
    WebApp { url: String },
    /// Open an external link.
    Url(String),
    /// Send this data back as a callback.
    CallbackData(String),
}

impl Button {
    fn web_app(text: &str, url: &str) -> Self {
        Self {
            text: text.to_string(),
            action: ButtonAction::WebApp {
                url: url.to_string(),
            },
        }
    }

    fn url(text: &str, url: &str) -> Self {
        Self {
            text: text.to_string(),
            action: ButtonAction::Url(url.to_string()),
        }
    }

    fn callback(text: &str, data: &str) -> Self {
        Self {
            text: text.to_string(),
            action: ButtonAction::CallbackData(data.to_string()),
        }
    }
}

/// Reply to `/start`.
///
/// A user whose Telegram id is already linked gets a welcome back with a
/// shortened address, and their stored username is refreshed if it changed.
pub fn start(
    registry: &Registry,
    config: &DaemonConfig,
    telegram_id: Option<&str>,
    telegram_username: Option<&str>,
) -> BotReply {
    let user = match telegram_id.map(|id| registry.find_user_by_telegram_id(id)) {
        Some(Ok(user)) => user,
        Some(Err(e)) => {
            warn!("Bot /start lookup failed: {}", e);
            return error_reply("❌ Something went wrong. Please try again later.");
        }
        None => None,
    };

    let text = match &user {
        Some(user) => format!(
            "Welcome back to DrawYourMeme! 🎨\n\nYour account: {}",
            short_address(&user.solana_address)
        ),
        None => "Welcome to DrawYourMeme! 🎨\n\n\
                 The first meme token launchpad where you draw, name, and launch tokens instantly!\n\n\
                 🚀 No wallet connection required\n\
                 🎨 Just draw and create\n\
                 💰 Launch on PumpFun instantly"
            .to_string(),
    };

    if let (Some(user), Some(username)) = (&user, telegram_username) {
        if user.telegram_username.as_deref() != Some(username) {
            let update = UserUpdate {
                telegram_username: Some(username.to_string()),
                ..Default::default()
            };
            if let Err(e) = registry.update_user(&user.id, update) {
                warn!("Failed to refresh telegram username: {}", e);
            }
        }
    }

    BotReply {
        text,
        parse_mode: Some(ParseMode::Html),
        keyboard: main_menu(config),
    }
}

/// Reply to an inline button press.
pub fn callback(registry: &Registry, config: &DaemonConfig, data: &str) -> BotReply {
    match data {
        "gallery" => gallery(registry, config).unwrap_or_else(|e| {
            warn!("Bot gallery failed: {}", e);
            error_reply("❌ Error loading gallery. Please try again.")
        }),
        "stats" => stats(registry, config).unwrap_or_else(|e| {
            warn!("Bot stats failed: {}", e);
            error_reply("❌ Error loading stats. Please try again.")
        }),
        "help" => help(config),
        "menu" => BotReply {
            text: "🎨 <b>DrawYourMeme Menu</b>\n\nChoose an option below:".to_string(),
            parse_mode: Some(ParseMode::Html),
            keyboard: main_menu(config),
        },
        _ => error_reply("❌ Unknown action. Please try again."),
    }
}

/// Reply to a plain chat message. Commands get no fallback reply.
pub fn message(config: &DaemonConfig, text: &str) -> Option<BotReply> {
    if text.starts_with('/') {
        return None;
    }
    Some(BotReply {
        text: "🎨 Welcome to DrawYourMeme!\n\nUse the menu below or type /start to begin:"
            .to_string(),
        parse_mode: None,
        keyboard: vec![
            vec![Button::web_app("🎮 Play DrawYourMeme", &config.bot.webapp_url)],
            vec![Button::callback("/start - Show Main Menu", "menu")],
        ],
    })
}

fn gallery(registry: &Registry, config: &DaemonConfig) -> drawmeme_db::Result<BotReply> {
    let tokens = registry.list_recent_tokens(config.feed.gallery_size)?;
    Ok(BotReply {
        text: gallery_text(&tokens),
        parse_mode: Some(ParseMode::Html),
        keyboard: vec![
            vec![Button::web_app("🎮 Create Your Token", &config.bot.webapp_url)],
            vec![Button::callback("🔙 Back to Menu", "menu")],
        ],
    })
}

fn gallery_text(tokens: &[Token]) -> String {
    let mut text = String::from("🖼️ <b>Recent Meme Tokens</b>\n\n");
    if tokens.is_empty() {
        text.push_str("No tokens created yet! Be the first to launch a meme token! 🚀");
        return text;
    }
    for (index, token) in tokens.iter().enumerate() {
        text.push_str(&format!(
            "{}. <b>{}</b> ({})\n   💎 {} votes\n",
            index + 1,
            escape_html(&token.name),
            escape_html(&token.ticker),
            token.votes
        ));
        if let Some(link) = &token.pumpfun_link {
            text.push_str(&format!(
                "   🔗 <a href=\"{}\">View on PumpFun</a>\n",
                escape_html(link)
            ));
        }
        text.push('\n');
    }
    text
}

fn stats(registry: &Registry, config: &DaemonConfig) -> drawmeme_db::Result<BotReply> {
    let stats = registry.token_stats()?;
    let top = match &stats.top_token {
        Some(token) => format!("{} ({} votes)", escape_html(&token.name), token.votes),
        None => "None yet".to_string(),
    };
    Ok(BotReply {
        text: format!(
            "📊 <b>DrawYourMeme Stats</b>\n\n\
             🚀 Total Tokens Launched: {}\n\
             💎 Total Votes: {}\n\
             👑 Top Token: {}\n\n\
             Join the meme revolution! 🎨",
            stats.total_tokens, stats.total_votes, top
        ),
        parse_mode: Some(ParseMode::Html),
        keyboard: vec![
            vec![Button::web_app("🎮 Launch Your Token", &config.bot.webapp_url)],
            vec![Button::callback("🔙 Back to Menu", "menu")],
        ],
    })
}

fn help(config: &DaemonConfig) -> BotReply {
    BotReply {
        text: "❓ <b>How to Use DrawYourMeme</b>\n\n\
               1. 🎮 Click \"Play DrawYourMeme\" to open the app\n\
               2. 🎨 Draw your meme on the 500x500 canvas\n\
               3. 📝 Give it a name and ticker symbol\n\
               4. 🚀 Launch your token instantly on PumpFun\n\
               5. 📢 Share with friends and get votes!\n\n\
               💡 <b>Tips:</b>\n\
               • No wallet connection needed\n\
               • Tokens deploy automatically\n\
               • Each Solana address = 1 account\n\
               • Vote on others' tokens in gallery\n\n\
               Ready to create? 🎨"
            .to_string(),
        parse_mode: Some(ParseMode::Html),
        keyboard: vec![
            vec![Button::web_app("🎮 Start Creating", &config.bot.webapp_url)],
            vec![Button::callback("🔙 Back to Menu", "menu")],
        ],
    }
}

fn main_menu(config: &DaemonConfig) -> Vec<Vec<Button>> {
    vec![
        vec![Button::web_app("🎮 Play DrawYourMeme", &config.bot.webapp_url)],
        vec![Button::url("💎 Buy $DRAWYOURMEME Token", &config.bot.token_link)],
        vec![
            Button::callback("🖼️ Gallery", "gallery"),
            Button::callback("📊 Stats", "stats"),
        ],
        vec![
            Button::callback("❓ Help", "help"),
            Button::url("📢 Channel", &config.bot.channel_url),
        ],
    ]
}

fn error_reply(text: &str) -> BotReply {
    BotReply {
        text: text.to_string(),
        parse_mode: None,
        keyboard: Vec::new(),
    }
}

/// `ABCD...WXYZ` form of an address.
fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 8 {
        return address.to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
