//! Gateway event handler: previews for links, replies when addressed.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use serenity::all::{ActivityData, Context, CreateMessage, EventHandler, Message, Ready, UserId};
use tracing::{debug, error, info, warn};

use crate::dialogue::{Addressing, DialogueOrchestrator};
use crate::discord::embed::{MESSAGE_CHAR_LIMIT, card_embed, split_message};
use crate::preview::{MessageContext, compose_card};
use crate::scraping::LinkPreviewService;

/// Activity shown while connected, as "Playing ...".
pub const PRESENCE_TEXT: &str = "chats & links with celestial sparkle! 💖";

/// Who the bot is, known once the gateway is ready.
#[derive(Clone, Debug)]
struct BotIdentity {
    addressing: Addressing,
    default_avatar_url: String,
}

/// Serenity event handler wiring messages into previews and dialogue.
pub struct MikaHandler {
    previews: Arc<LinkPreviewService>,
    dialogue: Arc<DialogueOrchestrator>,
    identity: OnceLock<BotIdentity>,
}

impl MikaHandler {
    /// Create a handler.
    #[must_use]
    pub const fn new(
        previews: Arc<LinkPreviewService>,
        dialogue: Arc<DialogueOrchestrator>,
    ) -> Self {
        Self {
            previews,
            dialogue,
            identity: OnceLock::new(),
        }
    }

    async fn post_preview(&self, ctx: &Context, msg: &Message, identity: &BotIdentity) {
        let Some(metadata) = self.previews.preview_for_message(&msg.content).await else {
            return;
        };

        let in_guild = msg.guild_id.is_some();
        let channel_name = if in_guild {
            match msg.channel_id.name(ctx).await {
                Ok(name) => Some(name),
                Err(err) => {
                    debug!(%err, channel_id = %msg.channel_id, "Could not resolve channel name");
                    None
                }
            }
        } else {
            None
        };

        let context = MessageContext {
            author_name: author_name(msg),
            author_avatar_url: msg.author.avatar_url(),
            channel_name,
            in_guild,
            bot_default_avatar_url: identity.default_avatar_url.clone(),
        };

        let card = compose_card(&metadata, &context);
        let message = CreateMessage::new().embed(card_embed(&card));
        match msg.channel_id.send_message(&ctx.http, message).await {
            Ok(_) => info!(url = %metadata.source_url, channel_id = %msg.channel_id, "Posted link preview"),
            Err(err) => warn!(%err, channel_id = %msg.channel_id, "Failed to post link preview"),
        }
    }

    async fn reply(&self, ctx: &Context, msg: &Message, identity: &BotIdentity) {
        let _typing = msg.channel_id.start_typing(&ctx.http);

        let Some(reply) = self
            .dialogue
            .respond(&msg.content, msg.channel_id.get(), &identity.addressing)
            .await
        else {
            return;
        };

        for chunk in split_message(&reply, MESSAGE_CHAR_LIMIT) {
            if let Err(err) = msg.channel_id.say(&ctx.http, chunk).await {
                warn!(%err, channel_id = %msg.channel_id, "Failed to send reply");
                break;
            }
        }
    }

    fn is_addressed(msg: &Message, identity: &BotIdentity) -> bool {
        msg.guild_id.is_none()
            || msg.mentions_user_id(UserId::new(identity.addressing.bot_user_id()))
    }
}

/// Work done for one incoming message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    Preview,
    Reply,
}

/// The preview is always posted before the reply.
const fn steps(addressed: bool) -> &'static [Step] {
    if addressed {
        &[Step::Preview, Step::Reply]
    } else {
        &[Step::Preview]
    }
}

fn author_name(msg: &Message) -> String {
    shown_name(
        msg.member.as_ref().and_then(|member| member.nick.as_deref()),
        msg.author.display_name(),
    )
}

/// Guild nickname when there is one, else the account's display name.
fn shown_name(nick: Option<&str>, account_name: &str) -> String {
    nick.filter(|nick| !nick.trim().is_empty())
        .unwrap_or(account_name)
        .to_string()
}

#[async_trait]
impl EventHandler for MikaHandler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(bot = %ready.user.name, id = %ready.user.id, "Logged in");
        ctx.set_activity(Some(ActivityData::playing(PRESENCE_TEXT)));

        match Addressing::new(ready.user.id.get(), &ready.user.name) {
            Ok(addressing) => {
                let identity = BotIdentity {
                    addressing,
                    default_avatar_url: ready.user.default_avatar_url(),
                };
                if self.identity.set(identity).is_err() {
                    debug!("Gateway resumed, identity already known");
                }
                info!(bot = %ready.user.name, "Mika is online and ready to dazzle! ✨");
            }
            Err(err) => error!(%err, "Could not build mention pattern for bot name"),
        }
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        let Some(identity) = self.identity.get() else {
            debug!("Message received before ready, ignoring");
            return;
        };

        for step in steps(Self::is_addressed(&msg, identity)) {
            match step {
                Step::Preview => self.post_preview(&ctx, &msg, identity).await,
                Step::Reply => self.reply(&ctx, &msg, identity).await,
            }
        }
    }
}
