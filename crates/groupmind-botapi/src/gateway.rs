//! The bot gateway contract — an interface only. The concrete
//! protocol adapter (OneBot/whatever wire format the deployment speaks) is
//! bot-protocol glue, out of scope

use async_trait::async_trait;

use groupmind_core::types::{GroupId, MessageId, UserId};

use crate::error::Result;
use crate::types::{FetchedMessage, GroupInfo, MemberInfo, MemberList, Segment};

#[async_trait]
pub trait BotGateway: Send + Sync {
    async fn send_group_msg(&self, group_id: GroupId, segments: Vec<Segment>) -> Result<MessageId>;

    async fn send_private_msg(
        &self,
        user_id: UserId,
        segments: Vec<Segment>,
    ) -> Result<MessageId>;

    async fn get_msg(&self, message_id: MessageId) -> Result<FetchedMessage>;

    async fn get_group_info(&self, group_id: GroupId) -> Result<GroupInfo>;

    async fn get_group_member_info(
        &self,
        group_id: GroupId,
        user_id: UserId,
    ) -> Result<MemberInfo>;

    async fn get_group_member_list(&self, group_id: GroupId) -> Result<MemberList>;

    async fn get_group_msg_history(
        &self,
        group_id: GroupId,
        count: u32,
    ) -> Result<Vec<FetchedMessage>>;

    async fn set_group_ban(&self, group_id: GroupId, user_id: UserId, seconds: u64) -> Result<()>;

    async fn set_group_kick(&self, group_id: GroupId, user_id: UserId) -> Result<()>;

    async fn set_group_card(&self, group_id: GroupId, user_id: UserId, card: String)
        -> Result<()>;

    async fn set_group_special_title(
        &self,
        group_id: GroupId,
        user_id: UserId,
        title: String,
    ) -> Result<()>;

    async fn set_group_whole_ban(&self, group_id: GroupId, enable: bool) -> Result<()>;

    async fn group_poke(&self, group_id: GroupId, user_id: UserId) -> Result<()>;
}
