//! These models represent the objects passed between the endpoint, the assistant and the LLM
//!
//! There are two related formats we need to interact with:
//! - the chat request sent by the caller, a prompt plus optional context items
//! - openai messages/tools, sent from the assistant to the LLM
//!
//! We always immediately convert those into the internal structs using to/from helpers,
//! so the internal models are not an exact match to either format.
pub mod message;
pub mod role;
pub mod tool;
