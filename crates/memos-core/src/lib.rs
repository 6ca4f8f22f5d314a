//! memos-core: domain types and pure logic for memos
//!
//! This crate provides:
//! - Typed entities (users, memos, tags, resources, settings)
//! - Signed bearer tokens
//! - Hashtag extraction
//! - A line-oriented Markdown node codec
//!
//! Nothing here touches the network or the database.

pub mod markdown;
pub mod tags;
pub mod token;
pub mod types;

pub use markdown::{InlineLayout, Node, ParseOptions, parse, parse_with, restore};
pub use tags::extract_tags;
pub use token::{Claims, TokenAuthenticator, TokenError};
pub use types::{
    Memo, Resource, Role, RowStatus, Tag, UnknownVariant, User, UserSetting, Visibility,
    now_ts, object_key,
};
