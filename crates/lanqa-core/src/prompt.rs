//! Rendering retrieval results into the context block and the final prompt.

use std::fmt::Write as _;

use crate::item::RetrievalResult;

/// Context returned when nothing was retrieved.
pub const NO_INFORMATION: &str = "知识库中暂无相关信息。";

/// Render `results` as a numbered list, in the order given.
pub fn build_context(results: &[RetrievalResult]) -> String {
  if results.is_empty() {
    return NO_INFORMATION.to_owned();
  }

  let mut out = String::from("=== 相关知识 ===\n");
  for (i, result) in results.iter().enumerate() {
    let item = &result.item;
    // Writing to a String cannot fail.
    let _ = writeln!(out, "{}. 【{}】{}", i + 1, item.category, item.question);
    let _ = writeln!(out, "   答案：{}", item.answer);
    let _ = writeln!(out, "   相似度：{:.3}", result.similarity);
    out.push('\n');
  }
  out
}

/// Assemble the prompt sent to the chat model.
pub fn build_prompt(question: &str, context: &str, system_prompt: &str) -> String {
  format!(
    "{system_prompt}

=== 知识上下文 ===
{context}

=== 用户问题 ===
{question}

=== 要求 ===
1. 请基于知识上下文回答用户问题
2. 回答要准确、专业、友好
3. 如果知识库中没有相关信息，请基于你的专业知识提供回答
4. 回答请使用中文
5. 请详细解释，不要过于简短"
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::item::KnowledgeItem;

  fn result(id: i64, similarity: f64) -> RetrievalResult {
    RetrievalResult {
      item: KnowledgeItem {
        id,
        question: format!("question {id}"),
        answer:   format!("answer {id}"),
        category: "美食".into(),
      },
      similarity,
    }
  }

  #[test]
  fn empty_results_render_marker() {
    assert_eq!(build_context(&[]), NO_INFORMATION);
  }

  #[test]
  fn context_is_numbered_in_given_order() {
    let context = build_context(&[result(2, 0.91234), result(1, 0.5)]);
    let expected = "=== 相关知识 ===\n\
                    1. 【美食】question 2\n   答案：answer 2\n   相似度：0.912\n\n\
                    2. 【美食】question 1\n   答案：answer 1\n   相似度：0.500\n\n";
    assert_eq!(context, expected);
  }

  #[test]
  fn prompt_contains_all_sections_in_order() {
    let prompt = build_prompt("黄河在哪", "CONTEXT", "你是兰州旅游专家");
    let positions: Vec<usize> = [
      "你是兰州旅游专家",
      "=== 知识上下文 ===",
      "CONTEXT",
      "=== 用户问题 ===",
      "黄河在哪",
      "=== 要求 ===",
      "5. 请详细解释",
    ]
    .iter()
    .map(|needle| prompt.find(needle).unwrap_or_else(|| panic!("missing {needle}")))
    .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
  }

  #[test]
  fn prompt_is_deterministic() {
    assert_eq!(build_prompt("q", "c", "s"), build_prompt("q", "c", "s"));
  }
}
