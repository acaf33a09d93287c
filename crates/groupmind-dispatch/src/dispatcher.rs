//! The Dispatcher — event intake, trigger/whitelist/rate/follow-up gates,
//! and the `process_chat` turn.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{info, instrument, warn};

use groupmind_botapi::{BotGateway, FetchedMessage, GroupPoke, ImageSource, InboundEvent, InboundMessage, Segment};
use groupmind_core::config::Config;
use groupmind_core::types::{GroupId, MemberRole, MessageRole, SessionId, SessionType, UserId};
use groupmind_engine::{ChatEngine, ChatEngineDeps, PromptContextBase};
use groupmind_humanizer::memory::{generate_question, run_search_agent};
use groupmind_humanizer::{apply_typos, ActionPlanner, EmojiSystem, ExpressionLearner, FrequencyController, TopicTracker};
use groupmind_llm::{ChatMessage, LlmClient};
use groupmind_prompt::{pick_personality_state, pick_reply_style, Environment, ExternalSkillEntry, HistoryLine, LoadedSkillEntry, TargetMessageView};
use groupmind_ratelimit::{RateLimitConfig, RateLimiter};
use groupmind_sessions::SessionManager;
use groupmind_skills::SkillRegistry;
use groupmind_store::{NewMessage, Store};
use groupmind_tools::{build_catalog, PendingOutputs, ToolContext};

use crate::convert;
use crate::error::Result;
use crate::guards::{FollowUpMap, InFlightGuard, PokeCooldown};
use crate::trigger::{self, Trigger};

/// Follow-up window for a reply-without-mention to still count as a trigger.
const FOLLOW_UP_WINDOW_MS: i64 = 3 * 60 * 1000;
/// The poke path's own cooldown, internal to the dispatcher like the rate
/// limiter's.
const POKE_COOLDOWN_MS: i64 = 10 * 60 * 1000;
/// Chat history window loaded for one prompt: last 30 messages.
const HISTORY_LOAD_LIMIT: usize = 30;
const INTER_LINE_DELAY: Duration = Duration::from_millis(300);

/// Everything needed to run the group-chat conversation engine end to end.
/// One `Dispatcher` serves every session; per-event entry points
/// (`handle_message`, `handle_poke`) are meant to be invoked from an
/// independent task per inbound event, via a `tokio::spawn`-per-message
/// handler.
pub struct Dispatcher {
    gateway: Arc<dyn BotGateway>,
    llm: Arc<dyn LlmClient>,
    store: Arc<Store>,
    sessions: Arc<SessionManager>,
    rate_limiter: Arc<RateLimiter>,
    skills: Arc<SkillRegistry>,
    topics: Arc<TopicTracker>,
    expressions: Arc<ExpressionLearner>,
    planner: Arc<ActionPlanner>,
    frequency: Arc<FrequencyController>,
    emoji: Option<Arc<EmojiSystem>>,
    in_flight: InFlightGuard,
    follow_up: FollowUpMap,
    poke_cooldown: PokeCooldown,
    bot_uin: UserId,
}

enum Destination {
    Group(GroupId),
    Private(UserId),
}

impl Dispatcher {
    /// Construct the dispatcher's stateful subsystems from a config
    /// snapshot. Per-turn values (persona, model, temperature, allow-lists)
    /// are re-read fresh from the caller-supplied `Config` on every
    /// `handle_message`/`handle_poke` call; the subsystems built here
    /// (rate limiter, skill registry, topic tracker, planner, frequency
    /// controller, emoji system) carry the config they were constructed
    /// with for their process lifetime.
    pub fn new(cfg: &Config, bot_uin: UserId, gateway: Arc<dyn BotGateway>, llm: Arc<dyn LlmClient>, store: Arc<Store>) -> Self {
        let sessions = Arc::new(SessionManager::new(Arc::clone(&store), cfg.max_sessions));
        let emoji = cfg.emoji.enabled.then(|| Arc::new(EmojiSystem::new(cfg.emoji.clone())));

        Self {
            gateway,
            llm,
            store,
            sessions,
            rate_limiter: RateLimiter::new(RateLimitConfig::default()),
            skills: SkillRegistry::new(),
            topics: Arc::new(TopicTracker::new(cfg.topic.clone())),
            expressions: Arc::new(ExpressionLearner::new(cfg.expression.clone())),
            planner: Arc::new(ActionPlanner::new()),
            frequency: Arc::new(FrequencyController::new(convert::frequency_config(&cfg.frequency))),
            emoji,
            in_flight: InFlightGuard::new(),
            follow_up: FollowUpMap::new(),
            poke_cooldown: PokeCooldown::new(),
            bot_uin,
        }
    }

    pub fn skills(&self) -> &Arc<SkillRegistry> {
        &self.skills
    }

    /// Start the rate limiter's and skill registry's periodic sweeps.
    /// `shutdown` fires once to stop both loops, mirroring
    /// `RateLimiter::spawn_cleanup`'s own shutdown contract.
    pub fn spawn_maintenance(self: &Arc<Self>, shutdown: watch::Receiver<bool>) -> Vec<JoinHandle<()>> {
        vec![
            self.rate_limiter.spawn_cleanup(shutdown.clone()),
            self.skills.spawn_sweep(shutdown),
        ]
    }

    /// Entry point for every inbound event: a chat message or a group poke.
    pub async fn handle_event(&self, cfg: &Config, event: InboundEvent) {
        match event {
            InboundEvent::Message(msg) => self.handle_message(cfg, msg).await,
            InboundEvent::GroupPoke(poke) => self.handle_poke(cfg, poke).await,
        }
    }

    #[instrument(skip(self, cfg, msg), fields(sender = msg.sender_id, group = msg.group_id))]
    pub async fn handle_message(&self, cfg: &Config, msg: InboundMessage) {
        // 2. Drop messages from the bot itself.
        if msg.sender_id == self.bot_uin {
            return;
        }

        // 3. Slash commands.
        if msg.raw_text.trim_start().starts_with('/') {
            if self.handle_slash_command(cfg, &msg).await {
                return;
            }
        }

        // 4. Group allow-list.
        if let Some(group_id) = msg.group_id {
            if !is_group_allowed(group_id, cfg) {
                return;
            }
        }

        // 5. Decide trigger.
        let Some((trigger, quoted)) = self.decide_trigger(cfg, &msg).await else {
            return;
        };

        let skip_planner = if !cfg.planner.enabled {
            // Planner disabled: `QuoteOfBot`/`FollowUp` proceed directly
            // rather than being routed through `self.planner.decide`.
            true
        } else {
            match trigger {
                Trigger::Direct => true,
                Trigger::QuoteOfBot => false,
                Trigger::FollowUp => {
                    // Pre-consult the Action Planner before `process_chat` is
                    // even invoked; only `reply` proceeds.
                    let Some(group_id) = msg.group_id else { return };
                    let session_id = SessionId::group(group_id);
                    let history = self.recent_chat_history(&session_id);
                    let bot_nickname = cfg.nicknames.first().map(String::as_str).unwrap_or("the bot");
                    let decision = self
                        .planner
                        .decide(self.llm.as_ref(), cfg.working_model(), &session_id, bot_nickname, &history, &msg.raw_text)
                        .await;
                    match decision {
                        Ok(d) if d.action == groupmind_humanizer::Action::Reply => true,
                        _ => return,
                    }
                }
            }
        };

        // 6. Rate limiter (group sessions only — DMs aren't spam-gated).
        if let Some(group_id) = msg.group_id {
            if !self.rate_limiter.check(msg.sender_id, group_id, &msg.raw_text) {
                return;
            }
            self.rate_limiter.record(msg.sender_id, group_id, &msg.raw_text);
        }

        // 7. process_chat.
        if let Err(e) = self.process_chat(cfg, &msg, skip_planner, quoted, None).await {
            warn!(error = %e, "process_chat failed");
        }
    }

    /// Evaluate the trigger rules against one inbound message. Returns
    /// `None` when nothing triggers a turn at all. A quote-of-bot trigger
    /// also returns the fetched quoted message, reused later for the
    /// "[Quoting NAME: ...]" content prefix instead of fetching it twice.
    async fn decide_trigger(&self, cfg: &Config, msg: &InboundMessage) -> Option<(Trigger, Option<FetchedMessage>)> {
        let Some(group_id) = msg.group_id else {
            // Personal (DM) sessions always trigger directly.
            return Some((Trigger::Direct, None));
        };

        if trigger::is_direct_mention(&msg.segments, &msg.raw_text, self.bot_uin, &cfg.nicknames) {
            return Some((Trigger::Direct, None));
        }

        if let Some(reply_mid) = first_reply_segment(&msg.segments) {
            if let Ok(quoted) = self.gateway.get_msg(reply_mid).await {
                if trigger::quotes_bot(Some(quoted.sender_id), self.bot_uin) {
                    return Some((Trigger::QuoteOfBot, Some(quoted)));
                }
            }
        }

        let session_id = SessionId::group(group_id);
        if self.follow_up.consume_if_recent(group_id, msg.sender_id, FOLLOW_UP_WINDOW_MS) {
            let _ = &session_id;
            return Some((Trigger::FollowUp, None));
        }

        None
    }

    async fn handle_slash_command(&self, cfg: &Config, msg: &InboundMessage) -> bool {
        match msg.raw_text.trim() {
            "/reset-self" => {
                if let Err(e) = self.sessions.reset(&SessionId::personal(msg.sender_id)) {
                    warn!(error = %e, "reset-self failed");
                }
                self.reply_ack(msg, "your personal session has been reset.").await;
                true
            }
            "/reset-group" => {
                let Some(group_id) = msg.group_id else {
                    return true;
                };
                let is_owner_admin = msg.sender_role.map(|r| r.is_admin_or_owner()).unwrap_or(false);
                let is_bot_owner = cfg.bot_owners.contains(&msg.sender_id);
                if !is_owner_admin && !is_bot_owner {
                    self.reply_ack(msg, "only a group admin, the group owner, or a bot owner can do that.").await;
                    return true;
                }
                if let Err(e) = self.sessions.reset(&SessionId::group(group_id)) {
                    warn!(error = %e, "reset-group failed");
                }
                self.reply_ack(msg, "this group's session has been reset.").await;
                true
            }
            _ => false,
        }
    }

    async fn reply_ack(&self, msg: &InboundMessage, text: &str) {
        let segments = vec![Segment::text(text)];
        let result = match msg.group_id {
            Some(group_id) => self.gateway.send_group_msg(group_id, segments).await,
            None => self.gateway.send_private_msg(msg.sender_id, segments).await,
        };
        if let Err(e) = result {
            warn!(error = %e, "failed to send slash command acknowledgement");
        }
    }

    /// Poke path: bypasses the normal
    /// trigger/rate-limit rules, but still goes through the in-flight
    /// guard and the Frequency gate inside `process_chat`.
    #[instrument(skip(self, cfg, poke), fields(group = poke.group_id, poker = poke.user_id))]
    pub async fn handle_poke(&self, cfg: &Config, poke: GroupPoke) {
        if poke.target_id != self.bot_uin {
            return;
        }
        if !is_group_allowed(poke.group_id, cfg) {
            return;
        }
        if !self.poke_cooldown.try_enter(poke.group_id, POKE_COOLDOWN_MS) {
            return;
        }

        let poker_name = self
            .gateway
            .get_group_member_info(poke.group_id, poke.user_id)
            .await
            .ok()
            .map(|m| m.display_name().to_string())
            .unwrap_or_else(|| poke.user_id.to_string());
        let synthetic_text = format!("[{poker_name} poked you]");

        let synthetic_msg = InboundMessage {
            message_id: 0,
            group_id: Some(poke.group_id),
            sender_id: poke.user_id,
            sender_name: poker_name,
            sender_role: None,
            sender_title: None,
            segments: vec![Segment::text(synthetic_text.clone())],
            raw_text: synthetic_text.clone(),
            timestamp: poke.timestamp,
        };

        if let Err(e) = self.process_chat(cfg, &synthetic_msg, true, None, Some(synthetic_text)).await {
            warn!(error = %e, "process_chat failed for poke event");
        }
    }

    /// Last `HISTORY_LOAD_LIMIT` messages for a session, as `ChatMessage`s
    /// for humanizer prompts that want plain chat turns rather than
    /// [`groupmind_prompt::HistoryLine`]s.
    fn recent_chat_history(&self, session_id: &SessionId) -> Vec<ChatMessage> {
        self.store
            .get_messages(session_id, HISTORY_LOAD_LIMIT, None)
            .unwrap_or_default()
            .into_iter()
            .map(|m| match m.role {
                MessageRole::Assistant => ChatMessage::assistant(m.content),
                MessageRole::System => ChatMessage::system(m.content),
                MessageRole::User => ChatMessage::user(format!("{}: {}", m.user_name.unwrap_or_default(), m.content)),
            })
            .collect()
    }

    /// Runs one full conversation turn for an already-triggered inbound event.
    ///
    /// `quoted` is the already-fetched message a reply segment points at
    /// (reused from trigger detection to avoid a second gateway round
    /// trip). `synthetic_content`, when set, replaces the persisted
    /// content outright instead of being derived from `msg` — used only by
    /// the poke path's "[NAME poked you]" placeholder.
    #[instrument(skip(self, cfg, msg, quoted, synthetic_content), fields(group = msg.group_id, sender = msg.sender_id))]
    async fn process_chat(
        &self,
        cfg: &Config,
        msg: &InboundMessage,
        skip_planner: bool,
        quoted: Option<FetchedMessage>,
        synthetic_content: Option<String>,
    ) -> Result<()> {
        let group_session_id = match msg.group_id {
            Some(group_id) => SessionId::group(group_id),
            None => SessionId::personal(msg.sender_id),
        };

        // Enter in-flight guard on the primary (group, or personal-as-primary
        // for DMs) session id; concurrent arrivals are dropped, not queued.
        let Some(_ticket) = self.in_flight.try_enter(&group_session_id) else {
            return Ok(());
        };

        let target_id = msg.group_id.unwrap_or(msg.sender_id);
        self.sessions.get_or_create(&group_session_id, target_id)?;
        let personal_session_id = SessionId::personal(msg.sender_id);
        if msg.is_group() {
            self.sessions.get_or_create(&personal_session_id, msg.sender_id)?;
        }

        let mut content = synthetic_content.unwrap_or_else(|| msg.raw_text.clone());
        if let Some(q) = &quoted {
            content = format!("[Quoting {}: \"{}\"] {}", q.sender_name, q.raw_text, content);
        }

        let mut new_msg = NewMessage::new(group_session_id.clone(), MessageRole::User, content.clone());
        new_msg.user_id = Some(msg.sender_id);
        new_msg.user_name = Some(msg.sender_name.clone());
        new_msg.user_role = msg.sender_role;
        new_msg.user_title = msg.sender_title.clone();
        new_msg.group_id = msg.group_id;
        new_msg.message_id = Some(msg.message_id);
        self.store.save_message(&new_msg)?;

        if msg.is_group() {
            let mut personal_msg = new_msg.clone();
            personal_msg.session_id = personal_session_id.clone();
            self.store.save_message(&personal_msg)?;
        }

        self.spawn_humanizer_fan_out(cfg, &group_session_id, msg, &content);

        // Frequency gate — group sessions only; DMs always proceed.
        if msg.is_group() && !self.frequency.should_speak(&group_session_id) {
            return Ok(());
        }

        let history_rows = self.store.get_messages(&group_session_id, HISTORY_LOAD_LIMIT, None)?;

        let mut planner_reason = None;
        if !skip_planner && cfg.planner.enabled {
            let history = self.recent_chat_history(&group_session_id);
            let bot_nickname = cfg.nicknames.first().map(String::as_str).unwrap_or("the bot");
            let decision = self
                .planner
                .decide(self.llm.as_ref(), cfg.working_model(), &group_session_id, bot_nickname, &history, &content)
                .await?;
            match decision.action {
                groupmind_humanizer::Action::Complete | groupmind_humanizer::Action::Wait => return Ok(()),
                groupmind_humanizer::Action::Reply => {}
            }
            planner_reason = Some(decision.reason);
        }

        let (group_name, group_size, bot_role) = match msg.group_id {
            Some(group_id) => {
                let info = self.gateway.get_group_info(group_id).await.ok();
                let role = self
                    .gateway
                    .get_group_member_info(group_id, self.bot_uin)
                    .await
                    .ok()
                    .map(|m| m.role)
                    .unwrap_or(MemberRole::Member);
                (info.as_ref().map(|i| i.group_name.clone()), info.map(|i| i.member_count), role)
            }
            None => (None, None, MemberRole::Member),
        };

        let history_for_memory = self.recent_chat_history(&group_session_id);
        let question = generate_question(self.llm.as_ref(), cfg.working_model(), &history_for_memory, &msg.sender_name, &content)
            .await
            .unwrap_or(None);
        let memory_result = match question {
            Some(q) => run_search_agent(self.llm.as_ref(), cfg.working_model(), Arc::clone(&self.store), &group_session_id, &q, &cfg.memory)
                .await
                .unwrap_or(None),
            None => None,
        };

        let expression_context = self.expressions.get_expression_context(&self.store, &group_session_id).unwrap_or_default();

        let loaded_skills: Vec<LoadedSkillEntry> = self
            .skills
            .loaded_skills(&group_session_id)
            .into_iter()
            .map(|(skill_name, tool_names)| LoadedSkillEntry { skill_name, tool_names })
            .collect();

        let external_skills = if cfg.enable_external_skills {
            self.skills
                .known_skills()
                .into_iter()
                .map(|s| ExternalSkillEntry { name: s.name.clone(), description: s.description.clone() })
                .collect()
        } else {
            Vec::new()
        };

        let can_mute = msg.is_group() && cfg.enable_group_admin && matches!(bot_role, MemberRole::Admin | MemberRole::Owner);

        let environment = Environment {
            local_time: chrono::Local::now().format("%H:%M:%S").to_string(),
            weekday: chrono::Local::now().format("%A").to_string(),
            chat_type: if msg.is_group() { SessionType::Group } else { SessionType::Personal },
            group_name,
            group_size,
            bot_role,
        };

        let history: Vec<HistoryLine> = history_rows
            .iter()
            .map(|m| HistoryLine {
                timestamp: m.timestamp.to_rfc3339(),
                speaker: m.user_name.clone().unwrap_or_else(|| m.role.to_string()),
                role: m.role.to_string(),
                title: m.user_title.clone(),
                message_id: m.message_id,
                content: m.content.clone(),
            })
            .collect();

        let target_message = TargetMessageView {
            speaker: msg.sender_name.clone(),
            user_id: msg.sender_id,
            content: content.clone(),
            message_id: Some(msg.message_id),
        };

        let base = PromptContextBase {
            loaded_skills,
            expression_context,
            memory_result,
            environment,
            history,
            target_message,
            planner_reason,
            persona: cfg.persona.clone(),
            personality_state: pick_personality_state(&cfg.personality),
            reply_style: pick_reply_style(&cfg.reply_style),
            can_mute,
            enable_group_admin: cfg.enable_group_admin,
            enable_external_skills: cfg.enable_external_skills,
            external_skills,
        };

        let pending = PendingOutputs::new();
        let tool_ctx = Arc::new(ToolContext {
            gateway: Arc::clone(&self.gateway),
            store: Arc::clone(&self.store),
            skills: Arc::clone(&self.skills),
            config: Arc::new(cfg.clone()),
            session_id: group_session_id.clone(),
            group_id: msg.group_id,
            triggering_user_id: msg.sender_id,
            bot_role,
            pending: Arc::clone(&pending),
        });
        let fixed_tools = build_catalog(&tool_ctx);

        let engine = ChatEngine::new(ChatEngineDeps {
            llm: Arc::clone(&self.llm),
            model: cfg.working_model().to_string(),
            temperature: Some(cfg.temperature),
            max_tokens: None,
            max_iterations: cfg.max_iterations,
            fixed_tools,
            skills: Arc::clone(&self.skills),
            session_id: group_session_id.clone(),
            pending,
            store: Arc::clone(&self.store),
            emoji: self.emoji.clone(),
        });

        let output = engine.run_chat(base).await;

        if output.ended {
            info!(reason = ?output.end_reason, "session ended by end_session tool");
            return Ok(());
        }

        if output.messages.is_empty() {
            return Ok(());
        }

        let mut assistant_msg = NewMessage::new(group_session_id.clone(), MessageRole::Assistant, output.raw_text.clone());
        assistant_msg.group_id = msg.group_id;
        self.store.save_message(&assistant_msg)?;

        let destination = match msg.group_id {
            Some(group_id) => Destination::Group(group_id),
            None => Destination::Private(msg.sender_id),
        };
        self.emit_outbound(cfg, &destination, &output.pending_ats, output.pending_quote, &output.messages).await;

        if let Some(path) = &output.emoji_path {
            let segments = vec![Segment::Image(ImageSource::File(path.to_string_lossy().into_owned()))];
            if let Err(e) = self.send(&destination, segments).await {
                warn!(error = %e, "failed to send emoji");
            }
        }

        if msg.is_group() {
            if let Some(group_id) = msg.group_id {
                self.follow_up.record(group_id, msg.sender_id);
            }
            self.frequency.record_speak(&group_session_id);
        }

        Ok(())
    }

    /// Expression learner / topic tracker / image-emoji registration all
    /// run off the critical path.
    fn spawn_humanizer_fan_out(&self, cfg: &Config, session_id: &SessionId, msg: &InboundMessage, content: &str) {
        if self.expressions.on_message(session_id, msg.sender_id, &msg.sender_name, content).is_some() {
            let expressions = Arc::clone(&self.expressions);
            let llm = Arc::clone(&self.llm);
            let store = Arc::clone(&self.store);
            let session_id = session_id.clone();
            let model = cfg.working_model().to_string();
            tokio::spawn(async move {
                expressions.flush(llm.as_ref(), &model, store, &session_id).await;
            });
        }

        if self.topics.on_message(session_id) {
            let topics = Arc::clone(&self.topics);
            let llm = Arc::clone(&self.llm);
            let store = Arc::clone(&self.store);
            let session_id = session_id.clone();
            let model = cfg.working_model().to_string();
            let batch_size = cfg.topic.message_threshold;
            tokio::spawn(async move {
                topics.analyze(llm.as_ref(), &model, store, &session_id, batch_size).await;
            });
        }

        if let Some(emoji) = &self.emoji {
            let images: Vec<ImageSource> = msg
                .segments
                .iter()
                .filter_map(|s| match s {
                    Segment::Image(src) => Some(src.clone()),
                    _ => None,
                })
                .collect();
            if !images.is_empty() {
                let emoji = Arc::clone(emoji);
                let llm = Arc::clone(&self.llm);
                let store = Arc::clone(&self.store);
                let model = cfg.working_model().to_string();
                let is_multimodal = cfg.is_multimodal;
                tokio::spawn(async move {
                    for src in images {
                        match src {
                            ImageSource::File(path) => {
                                emoji.register_incoming(llm.as_ref(), &model, is_multimodal, &store, std::path::Path::new(&path)).await;
                            }
                            ImageSource::Url(url) => {
                                emoji.register_incoming_url(llm.as_ref(), &model, is_multimodal, &store, &url).await;
                            }
                        }
                    }
                });
            }
        }
    }

    /// Emit outbound messages: the first message's first
    /// line carries the pending quote and all pending @-mentions; every
    /// line is its own gateway send with a 300 ms inter-line delay, typo'd
    /// individually; another 300 ms separates messages.
    async fn emit_outbound(
        &self,
        cfg: &Config,
        destination: &Destination,
        pending_ats: &[UserId],
        pending_quote: Option<groupmind_core::types::MessageId>,
        messages: &[String],
    ) {
        for (i, body) in messages.iter().enumerate() {
            let lines: Vec<&str> = body.split('\n').collect();
            for (j, line) in lines.iter().enumerate() {
                let mut segments = Vec::new();
                if i == 0 && j == 0 {
                    if let Some(mid) = pending_quote {
                        segments.push(Segment::Reply(mid));
                    }
                    for uid in pending_ats {
                        segments.push(Segment::At(*uid));
                    }
                }
                segments.push(Segment::text(apply_typos(&convert::typo_config(&cfg.typo), line)));

                if let Err(e) = self.send(destination, segments).await {
                    warn!(error = %e, "failed to send outbound message");
                }
                sleep(INTER_LINE_DELAY).await;
            }
        }
    }

    async fn send(&self, destination: &Destination, segments: Vec<Segment>) -> groupmind_botapi::error::Result<groupmind_core::types::MessageId> {
        match destination {
            Destination::Group(group_id) => self.gateway.send_group_msg(*group_id, segments).await,
            Destination::Private(user_id) => self.gateway.send_private_msg(*user_id, segments).await,
        }
    }
}

fn is_group_allowed(group_id: GroupId, cfg: &Config) -> bool {
    if !cfg.whitelist_groups.is_empty() {
        cfg.whitelist_groups.contains(&group_id)
    } else {
        !cfg.blacklist_groups.contains(&group_id)
    }
}

fn first_reply_segment(segments: &[Segment]) -> Option<groupmind_core::types::MessageId> {
    segments.iter().find_map(|s| match s {
        Segment::Reply(mid) => Some(*mid),
        _ => None,
    })
}
