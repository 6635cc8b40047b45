// ABOUTME: Merges response metadata chunks and assembles a full assistant message
// ABOUTME: from a recorded chunk stream.

use super::block::{concat_block_chunks, last_some, single};
use crate::error::ConcatError;
use crate::schema::{ContentBlockChunk, Message, ResponseExtension, ResponseMeta, StreamChunk};

/// Merge metadata chunks in arrival order.
///
/// Usage and extension fields take the last reported value; the vendor error
/// and incomplete details may be reported at most once.
pub fn concat_response_meta(metas: &[ResponseMeta]) -> Result<ResponseMeta, ConcatError> {
    match metas {
        [] => return Err(ConcatError::EmptyGroup),
        [only] => return Ok(only.clone()),
        _ => {}
    }

    let extensions: Vec<&ResponseExtension> =
        metas.iter().filter_map(|m| m.extension.as_ref()).collect();
    let extension = if extensions.is_empty() {
        None
    } else {
        Some(ResponseExtension {
            id: last_non_empty(extensions.iter().map(|e| e.id.as_str())),
            status: extensions.iter().filter_map(|e| e.status).last(),
            model: last_non_empty(extensions.iter().map(|e| e.model.as_str())),
            created_at: extensions.iter().filter_map(|e| e.created_at).last(),
            previous_response_id: last_some(extensions.iter().map(|e| &e.previous_response_id)),
            error: single(extensions.iter().map(|e| &e.error), "response errors")?,
            incomplete_details: single(
                extensions.iter().map(|e| &e.incomplete_details),
                "incomplete details",
            )?,
        })
    };

    Ok(ResponseMeta {
        usage: last_some(metas.iter().map(|m| &m.usage)),
        extension,
    })
}

/// Rebuild the final assistant message from every chunk a stream produced.
pub fn concat_chunks(chunks: &[StreamChunk]) -> Result<Message, ConcatError> {
    let mut blocks: Vec<ContentBlockChunk> = Vec::new();
    let mut metas: Vec<ResponseMeta> = Vec::new();
    for chunk in chunks {
        match chunk {
            StreamChunk::Block(block) => blocks.push(block.clone()),
            StreamChunk::Meta(meta) => metas.push(meta.clone()),
        }
    }

    let message = Message::assistant(concat_block_chunks(&blocks)?);
    if metas.is_empty() {
        return Ok(message);
    }
    Ok(message.with_response_meta(concat_response_meta(&metas)?))
}

fn last_non_empty<'a>(values: impl IntoIterator<Item = &'a str>) -> String {
    values
        .into_iter()
        .filter(|v| !v.is_empty())
        .last()
        .unwrap_or_default()
        .to_string()
}
