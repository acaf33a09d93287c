pub mod error;
pub mod gateway;
pub mod types;

pub use error::GatewayError;
pub use gateway::BotGateway;
pub use types::{
    FetchedMessage, GroupInfo, GroupPoke, ImageSource, InboundEvent, InboundMessage, MemberInfo,
    MemberList, Segment,
};
