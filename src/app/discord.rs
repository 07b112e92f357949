//! Serenity glue: gateway events, interaction replies and alert posts.

use std::sync::Arc;

use async_trait::async_trait;
use serenity::all::{
    ChannelId, Command, CommandDataOptionValue, CommandInteraction, CommandOptionType, Context,
    CreateCommand, CreateCommandOption, CreateEmbed, CreateEmbedFooter, CreateInteractionResponse,
    CreateInteractionResponseMessage, CreateMessage, EditInteractionResponse, EditMessage,
    EventHandler, Http, HttpError, Interaction, Mentionable, MessageId, Ready,
};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use valopro_core::commands::{COMMANDS, CommandSpec, OptionKind};
use valopro_core::{
    AlertSink, CommandInvocation, InteractionTransport, MatchCard, MatchService, MessageRef,
    OptionValue, Reply, TransportError, UNKNOWN_INTERACTION_CODE, dispatch,
};

/// Gateway event handler.
pub(crate) struct Handler {
    service: Arc<MatchService>,
    ready: watch::Sender<bool>,
    sync_commands: bool,
}

impl Handler {
    pub(crate) fn new(
        service: Arc<MatchService>,
        ready: watch::Sender<bool>,
        sync_commands: bool,
    ) -> Self {
        Self {
            service,
            ready,
            sync_commands,
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(user = %ready.user.name, guilds = ready.guilds.len(), "Connected to Discord");

        if self.sync_commands {
            match Command::set_global_commands(&ctx, command_definitions()).await {
                Ok(registered) => info!(count = registered.len(), "Slash commands registered"),
                Err(e) => warn!(error = %e, "Slash command registration failed"),
            }
        } else {
            debug!("Slash command registration skipped");
        }

        self.ready.send_replace(true);
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Interaction::Command(command) = interaction else {
            return;
        };
        let invocation = invocation_from(&command);
        debug!(command = %invocation.name, user = %command.user.name, "Slash command received");
        let transport = SlashCommandTransport::new(ctx.http.clone(), command);
        dispatch(&self.service, &transport, &invocation).await;
    }
}

/// Command catalogue as serenity builders.
pub(crate) fn command_definitions() -> Vec<CreateCommand> {
    COMMANDS.iter().map(command_definition).collect()
}

fn command_definition(entry: &CommandSpec) -> CreateCommand {
    entry.options.iter().fold(
        CreateCommand::new(entry.name).description(entry.description),
        |command, option| {
            let builder = match option.kind {
                OptionKind::Integer { min, max } => CreateCommandOption::new(
                    CommandOptionType::Integer,
                    option.name,
                    option.description,
                )
                .min_int_value(u64::try_from(min).unwrap_or(0))
                .max_int_value(u64::try_from(max).unwrap_or(0)),
                OptionKind::Text => CreateCommandOption::new(
                    CommandOptionType::String,
                    option.name,
                    option.description,
                ),
            };
            command.add_option(builder.required(option.required))
        },
    )
}

fn invocation_from(command: &CommandInteraction) -> CommandInvocation {
    command
        .data
        .options
        .iter()
        .fold(CommandInvocation::new(command.data.name.clone()), |invocation, option| {
            match &option.value {
                CommandDataOptionValue::Integer(n) => {
                    invocation.with_option(option.name.clone(), OptionValue::Integer(*n))
                }
                CommandDataOptionValue::String(text) => {
                    invocation.with_option(option.name.clone(), OptionValue::Text(text.clone()))
                }
                _ => invocation,
            }
        })
}

fn embed(card: &MatchCard) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title(card.title.clone())
        .colour(card.color)
        .footer(CreateEmbedFooter::new(card.footer.clone()));
    if let Some(description) = &card.description {
        embed = embed.description(description.clone());
    }
    if let Some(field) = &card.field {
        embed = embed.field(field.name.clone(), field.value.clone(), field.inline);
    }
    embed
}

fn embeds(reply: &Reply) -> Vec<CreateEmbed> {
    reply.cards.iter().map(embed).collect()
}

fn transport_error(error: serenity::Error) -> TransportError {
    match error {
        serenity::Error::Http(HttpError::UnsuccessfulRequest(response)) => {
            if response.error.code == UNKNOWN_INTERACTION_CODE {
                TransportError::TokenExpired
            } else {
                TransportError::Rejected {
                    status: response.status_code.as_u16(),
                    message: response.error.message,
                }
            }
        }
        other => TransportError::Other(other.to_string()),
    }
}

/// [`InteractionTransport`] bound to one slash-command invocation.
pub(crate) struct SlashCommandTransport {
    http: Arc<Http>,
    command: CommandInteraction,
}

impl SlashCommandTransport {
    pub(crate) fn new(http: Arc<Http>, command: CommandInteraction) -> Self {
        Self { http, command }
    }
}

#[async_trait]
impl InteractionTransport for SlashCommandTransport {
    fn user_mention(&self) -> String {
        self.command.user.mention().to_string()
    }

    async fn acknowledge(&self, content: &str, ephemeral: bool) -> Result<(), TransportError> {
        let message = CreateInteractionResponseMessage::new()
            .content(content)
            .ephemeral(ephemeral);
        self.command
            .create_response(&*self.http, CreateInteractionResponse::Message(message))
            .await
            .map_err(transport_error)
    }

    async fn edit_acknowledgment(&self, reply: &Reply) -> Result<(), TransportError> {
        let edit = EditInteractionResponse::new()
            .content(reply.content.clone().unwrap_or_default())
            .embeds(embeds(reply));
        self.command
            .edit_response(&*self.http, edit)
            .await
            .map(|_| ())
            .map_err(transport_error)
    }

    async fn post_to_channel(&self, reply: &Reply) -> Result<MessageRef, TransportError> {
        let mut message = CreateMessage::new().embeds(embeds(reply));
        if let Some(content) = &reply.content {
            message = message.content(content.clone());
        }
        let posted = self
            .command
            .channel_id
            .send_message(&*self.http, message)
            .await
            .map_err(transport_error)?;
        Ok(MessageRef {
            channel_id: posted.channel_id.get(),
            message_id: posted.id.get(),
        })
    }

    async fn edit_channel_message(
        &self,
        message: MessageRef,
        reply: &Reply,
    ) -> Result<(), TransportError> {
        let (Some(channel_id), Some(message_id)) = (
            channel_id(message.channel_id),
            (message.message_id != 0).then(|| MessageId::new(message.message_id)),
        ) else {
            return Err(TransportError::Other("invalid message reference".to_string()));
        };
        let edit = EditMessage::new()
            .content(reply.content.clone().unwrap_or_default())
            .embeds(embeds(reply));
        channel_id
            .edit_message(&*self.http, message_id, edit)
            .await
            .map(|_| ())
            .map_err(transport_error)
    }
}

/// Snowflake ids are never zero and `ChannelId::new` panics on zero.
fn channel_id(id: u64) -> Option<ChannelId> {
    (id != 0).then(|| ChannelId::new(id))
}

/// [`AlertSink`] posting embeds through the REST client.
pub(crate) struct ChannelAlertSink {
    http: Arc<Http>,
}

impl ChannelAlertSink {
    pub(crate) fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl AlertSink for ChannelAlertSink {
    async fn channel_ready(&self, channel_id: u64) -> bool {
        let Some(channel) = self::channel_id(channel_id) else {
            return false;
        };
        match self.http.get_channel(channel).await {
            Ok(_) => true,
            Err(e) => {
                debug!(channel_id, error = %e, "Alert channel lookup failed");
                false
            }
        }
    }

    async fn post_card(&self, channel_id: u64, card: &MatchCard) -> Result<(), TransportError> {
        let channel = self::channel_id(channel_id)
            .ok_or_else(|| TransportError::Other("invalid channel id".to_string()))?;
        channel
            .send_message(&*self.http, CreateMessage::new().embed(embed(card)))
            .await
            .map(|_| ())
            .map_err(transport_error)
    }
}
