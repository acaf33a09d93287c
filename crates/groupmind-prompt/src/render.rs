//! Pure system-prompt assembly.
//!
//! `render` takes a fully-populated [`PromptContext`] and returns the
//! concatenated system prompt. It performs no I/O and no randomness — every
//! stochastic choice (personality state, reply style) is resolved upstream by
//! [`crate::style`] before the context reaches here. That split is what lets
//! this function be unit-tested with plain fixtures.

use crate::types::{Environment, PromptContext};
use groupmind_core::types::{MemberRole, SessionType};

/// Section label used for the bold "target message" block.
const TARGET_LABEL: &str = "**target message**";

/// Assemble the system prompt, omitting any section whose content is empty.
pub fn render(ctx: &PromptContext) -> String {
    let mut sections = Vec::with_capacity(11);

    if ctx.iteration > 0 {
        if let Some(s) = render_tool_results(ctx) {
            sections.push(s);
        }
    }
    if let Some(s) = render_loaded_skills(ctx) {
        sections.push(s);
    }
    if !ctx.expression_context.trim().is_empty() {
        sections.push(format!("# expression habits\n{}", ctx.expression_context));
    }
    if let Some(memory) = &ctx.memory_result {
        if !memory.trim().is_empty() {
            sections.push(format!("# memory\n{memory}"));
        }
    }
    sections.push(render_environment(&ctx.environment));
    if let Some(s) = render_history(ctx) {
        sections.push(s);
    }
    sections.push(render_target_message(ctx));
    if let Some(reason) = &ctx.planner_reason {
        if !reason.trim().is_empty() {
            sections.push(format!("# planner thoughts\n{reason}"));
        }
    }
    sections.push(render_persona(ctx));
    sections.push(render_response_format(ctx));

    sections.join("\n\n")
}

fn render_tool_results(ctx: &PromptContext) -> Option<String> {
    if ctx.tool_results.is_empty() {
        return None;
    }
    let mut body = String::from("# tool results\n");
    for r in &ctx.tool_results {
        let marker = if r.is_error { "error" } else { "ok" };
        body.push_str(&format!("- {} [{marker}]: {}\n", r.tool_name, r.content));
    }
    Some(body)
}

fn render_loaded_skills(ctx: &PromptContext) -> Option<String> {
    if ctx.loaded_skills.is_empty() {
        return None;
    }
    let mut body = String::from("# loaded skills\n");
    for skill in &ctx.loaded_skills {
        body.push_str(&format!(
            "- {}: {}\n",
            skill.skill_name,
            skill.tool_names.join(", ")
        ));
    }
    Some(body)
}

fn render_environment(env: &Environment) -> String {
    let chat_type = match env.chat_type {
        SessionType::Group => "group",
        SessionType::Personal => "personal",
    };
    let mut body = format!(
        "# environment\nlocal time: {}\nweekday: {}\nchat type: {chat_type}\n",
        env.local_time, env.weekday
    );
    if let Some(name) = &env.group_name {
        body.push_str(&format!("group: {name}\n"));
    }
    if let Some(size) = env.group_size {
        body.push_str(&format!("group size: {size}\n"));
    }
    let role = match env.bot_role {
        MemberRole::Owner => "owner",
        MemberRole::Admin => "admin",
        MemberRole::Member => "member",
    };
    body.push_str(&format!("bot role: {role}"));
    body
}

fn render_history(ctx: &PromptContext) -> Option<String> {
    if ctx.history.is_empty() {
        return None;
    }
    let mut body = String::from("# chat history\n");
    for line in &ctx.history {
        let title = line
            .title
            .as_ref()
            .map(|t| format!(" ({t})"))
            .unwrap_or_default();
        let msg_id = line
            .message_id
            .map(|id| format!(" #{id}"))
            .unwrap_or_default();
        body.push_str(&format!(
            "[{}] {}{}{} ({}){}: {}\n",
            line.timestamp, line.speaker, title, msg_id, line.role, "", line.content
        ));
    }
    Some(body)
}

fn render_target_message(ctx: &PromptContext) -> String {
    let t = &ctx.target_message;
    let msg_id = t
        .message_id
        .map(|id| format!(" #{id}"))
        .unwrap_or_default();
    format!(
        "{TARGET_LABEL}\n{} ({}){}: {}",
        t.speaker, t.user_id, msg_id, t.content
    )
}

fn render_persona(ctx: &PromptContext) -> String {
    let mut body = format!("# persona\n{}", ctx.persona);
    if let Some(state) = &ctx.personality_state {
        body.push_str(&format!("\ncurrent state: {state}"));
    }
    body.push_str(&format!("\nreply style: {}", ctx.reply_style));
    body
}

fn render_response_format(ctx: &PromptContext) -> String {
    let mut body = String::from(
        "# response format\n\
         Separate distinct outgoing messages with a line containing only `---`.\n\
         Call `at_user` to queue an @-mention, `quote_reply` to queue a quoted \
         reply, and `end_session` to stop responding without emitting anything.",
    );
    if ctx.can_mute {
        body.push_str(
            "\nYou may mute abusive members; prefer a warning before muting \
             where the situation allows it.",
        );
    } else {
        body.push_str(
            "\nYou cannot mute members in this chat; report serious abuse with \
             `report_abuse` instead.",
        );
    }
    if ctx.enable_group_admin {
        body.push_str("\nGroup administration tools are available in this chat.");
    }
    if ctx.enable_external_skills && !ctx.external_skills.is_empty() {
        body.push_str("\n\navailable skills:\n");
        for skill in &ctx.external_skills {
            body.push_str(&format!("- {}: {}\n", skill.name, skill.description));
        }
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{HistoryLine, TargetMessageView, ToolResultEntry};

    fn base_ctx() -> PromptContext {
        PromptContext {
            iteration: 0,
            tool_results: vec![],
            loaded_skills: vec![],
            expression_context: String::new(),
            memory_result: None,
            environment: Environment {
                local_time: "2026-07-28 10:00".into(),
                weekday: "Tuesday".into(),
                chat_type: SessionType::Group,
                group_name: Some("lab".into()),
                group_size: Some(12),
                bot_role: MemberRole::Member,
            },
            history: vec![],
            target_message: TargetMessageView {
                speaker: "alice".into(),
                user_id: 123,
                content: "hello".into(),
                message_id: Some(99),
            },
            planner_reason: None,
            persona: "a helpful bot".into(),
            personality_state: None,
            reply_style: "casual".into(),
            can_mute: false,
            enable_group_admin: false,
            enable_external_skills: false,
            external_skills: vec![],
        }
    }

    #[test]
    fn omits_empty_sections() {
        let ctx = base_ctx();
        let out = render(&ctx);
        assert!(!out.contains("tool results"));
        assert!(!out.contains("loaded skills"));
        assert!(!out.contains("expression habits"));
        assert!(!out.contains("memory"));
        assert!(!out.contains("chat history"));
        assert!(!out.contains("planner thoughts"));
        assert!(out.contains("**target message**"));
        assert!(out.contains("# persona"));
    }

    #[test]
    fn tool_results_only_shown_after_first_iteration() {
        let mut ctx = base_ctx();
        ctx.tool_results.push(ToolResultEntry {
            tool_name: "search_chat_history".into(),
            content: "found 3 rows".into(),
            is_error: false,
        });
        assert!(!render(&ctx).contains("tool results"));
        ctx.iteration = 1;
        assert!(render(&ctx).contains("tool results"));
    }

    #[test]
    fn section_order_is_fixed() {
        let mut ctx = base_ctx();
        ctx.iteration = 1;
        ctx.tool_results.push(ToolResultEntry {
            tool_name: "t".into(),
            content: "c".into(),
            is_error: false,
        });
        ctx.expression_context = "- likes puns".into();
        ctx.memory_result = Some("user asked about X before".into());
        ctx.history.push(HistoryLine {
            timestamp: "10:00".into(),
            speaker: "bob".into(),
            role: "user".into(),
            title: None,
            message_id: None,
            content: "hi".into(),
        });
        ctx.planner_reason = Some("keep chatting".into());

        let out = render(&ctx);
        let idx = |needle: &str| out.find(needle).unwrap();
        assert!(idx("tool results") < idx("expression habits"));
        assert!(idx("expression habits") < idx("memory"));
        assert!(idx("memory") < idx("environment"));
        assert!(idx("environment") < idx("chat history"));
        assert!(idx("chat history") < idx(TARGET_LABEL));
        assert!(idx(TARGET_LABEL) < idx("planner thoughts"));
        assert!(idx("planner thoughts") < idx("# persona"));
        assert!(idx("# persona") < idx("# response format"));
    }

    #[test]
    fn mute_capability_changes_response_format_text() {
        let mut ctx = base_ctx();
        ctx.can_mute = true;
        assert!(render(&ctx).contains("You may mute"));
        ctx.can_mute = false;
        assert!(render(&ctx).contains("cannot mute"));
    }
}
