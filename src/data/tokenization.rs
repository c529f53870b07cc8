// ============================================================
// Layer 4 — Tokenizer Adapter
// ============================================================
// Wraps a pretrained HuggingFace `tokenizer.json` and turns
// raw text into fixed-length model inputs:
//
//   "A fine film"  →  input_ids      [101, 1037, 2986, 2143, 102, 0, 0, ...]
//                     attention_mask [  1,    1,    1,    1,   1, 0, 0, ...]
//
// Every sequence is padded on the right with [PAD] and
// truncated on the right so that it is exactly `max_len`
// tokens long, special tokens included. This lets the batcher
// stack samples without any dynamic padding.
//
// Reference: tokenizers crate documentation (PaddingParams,
//            TruncationParams)

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokenizers::{Encoding, PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};

/// Padding token of BERT-style vocabularies
const PAD_TOKEN: &str = "[PAD]";

/// One tokenised text, always `max_len` long.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedText {
    pub input_ids:      Vec<u32>,
    pub attention_mask: Vec<u32>,
}

impl EncodedText {
    /// Number of non-padding tokens
    pub fn real_len(&self) -> usize {
        self.attention_mask.iter().filter(|&&m| m == 1).count()
    }
}

impl From<&Encoding> for EncodedText {
    fn from(enc: &Encoding) -> Self {
        Self {
            input_ids:      enc.get_ids().to_vec(),
            attention_mask: enc.get_attention_mask().to_vec(),
        }
    }
}

pub struct TokenizerAdapter {
    tokenizer: Tokenizer,
    max_len:   usize,
}

impl TokenizerAdapter {
    /// Load a tokenizer file and fix its padding/truncation to `max_len`.
    pub fn from_file(path: impl AsRef<Path>, max_len: usize) -> Result<Self> {
        ensure!(max_len > 0, "max_len must be at least 1");

        let path = path.as_ref();
        let mut tokenizer = Tokenizer::from_file(path).map_err(|e| {
            anyhow::anyhow!("Cannot load tokenizer from '{}': {e}", path.display())
        })?;

        let pad_id = tokenizer.token_to_id(PAD_TOKEN).unwrap_or(0);
        tokenizer.with_padding(Some(PaddingParams {
            strategy:  PaddingStrategy::Fixed(max_len),
            pad_id,
            pad_token: PAD_TOKEN.to_string(),
            ..Default::default()
        }));
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: max_len,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("Invalid truncation settings: {e}"))?;

        tracing::debug!(
            "Tokenizer ready: vocab={} max_len={} pad_id={}",
            tokenizer.get_vocab_size(true),
            max_len,
            pad_id
        );
        Ok(Self { tokenizer, max_len })
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Tokenise one text
    pub fn encode(&self, text: &str) -> Result<EncodedText> {
        let enc = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| anyhow::anyhow!("Tokenisation error: {e}"))?;
        Ok(EncodedText::from(&enc))
    }

    /// Tokenise many texts at once (parallelised inside `tokenizers`)
    pub fn encode_batch(&self, texts: &[String]) -> Result<Vec<EncodedText>> {
        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| anyhow::anyhow!("Tokenisation error: {e}"))?;
        Ok(encodings.iter().map(EncodedText::from).collect())
    }
}

// ─── Test Fixture ─────────────────────────────────────────────────────────────
/// Writes a word-level tokenizer in HuggingFace JSON format.
/// [PAD]=0, [UNK]=1, then `words` in order starting at id 2.
#[cfg(test)]
pub(crate) fn write_test_tokenizer(dir: &Path, words: &[&str]) -> std::path::PathBuf {
    let mut vocab = serde_json::json!({ "[PAD]": 0, "[UNK]": 1 });
    for (i, w) in words.iter().enumerate() {
        vocab[*w] = serde_json::json!(i + 2);
    }

    let tokenizer_json = serde_json::json!({
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": [
            {"id": 0, "content": "[PAD]", "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
            {"id": 1, "content": "[UNK]", "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true}
        ],
        "normalizer": {
            "type": "BertNormalizer",
            "clean_text": true,
            "handle_chinese_chars": true,
            "strip_accents": null,
            "lowercase": true
        },
        "pre_tokenizer": { "type": "Whitespace" },
        "post_processor": null,
        "decoder": null,
        "model": {
            "type": "WordLevel",
            "vocab": vocab,
            "unk_token": "[UNK]"
        }
    });

    let path = dir.join("tokenizer.json");
    std::fs::write(&path, serde_json::to_string_pretty(&tokenizer_json).unwrap()).unwrap();
    path
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn adapter(max_len: usize) -> (tempfile::TempDir, TokenizerAdapter) {
        let dir  = tempfile::tempdir().unwrap();
        let path = write_test_tokenizer(dir.path(), &["a", "great", "film", "bad"]);
        let tok  = TokenizerAdapter::from_file(&path, max_len).unwrap();
        (dir, tok)
    }

    #[test]
    fn test_short_text_is_padded() {
        let (_dir, tok) = adapter(6);
        let enc = tok.encode("A great film").unwrap();
        assert_eq!(enc.input_ids,      vec![2, 3, 4, 0, 0, 0]);
        assert_eq!(enc.attention_mask, vec![1, 1, 1, 0, 0, 0]);
        assert_eq!(enc.real_len(), 3);
    }

    #[test]
    fn test_long_text_is_truncated() {
        let (_dir, tok) = adapter(2);
        let enc = tok.encode("great great bad film").unwrap();
        assert_eq!(enc.input_ids,      vec![3, 3]);
        assert_eq!(enc.attention_mask, vec![1, 1]);
    }

    #[test]
    fn test_unknown_words_map_to_unk() {
        let (_dir, tok) = adapter(3);
        let enc = tok.encode("terrible").unwrap();
        assert_eq!(enc.input_ids[0], 1);
    }

    #[test]
    fn test_batch_has_fixed_length() {
        let (_dir, tok) = adapter(4);
        let texts = vec!["bad".to_string(), "a great great great film".to_string()];
        let encs  = tok.encode_batch(&texts).unwrap();
        assert_eq!(encs.len(), 2);
        assert!(encs.iter().all(|e| e.input_ids.len() == 4 && e.attention_mask.len() == 4));
        assert_eq!(encs[0].real_len(), 1);
        assert_eq!(encs[1].real_len(), 4);
        assert_eq!(encs[0], tok.encode("bad").unwrap());
    }

    #[test]
    fn test_zero_max_len_rejected() {
        let dir  = tempfile::tempdir().unwrap();
        let path = write_test_tokenizer(dir.path(), &["a"]);
        assert!(TokenizerAdapter::from_file(&path, 0).is_err());
    }
}
