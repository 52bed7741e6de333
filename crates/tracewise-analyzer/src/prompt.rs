//! LLM prompt engineering for traceability analysis

use tracewise_domain::{NormalizedInputs, PromptPayload};

/// Version of the system instruction; bump whenever its wording changes
pub const SYSTEM_INSTRUCTION_VERSION: &str = "2";

/// Build the system instruction and user message for one request
///
/// Pure: identical inputs always produce an identical payload.
pub fn compose(normalized: &NormalizedInputs) -> PromptPayload {
    PromptPayload {
        system_instruction: system_instruction(),
        user_message: user_message(normalized),
    }
}

/// The fixed reviewer instruction, including the output contract
pub fn system_instruction() -> String {
    let mut instruction = String::new();

    instruction.push_str(&format!(
        "TraceWise analysis instructions, version {}.\n\n",
        SYSTEM_INSTRUCTION_VERSION
    ));
    instruction.push_str(REVIEW_INSTRUCTIONS);
    instruction.push_str("\n\n");
    instruction.push_str(OUTPUT_FORMAT_REMINDER);

    instruction
}

fn user_message(normalized: &NormalizedInputs) -> String {
    // to_string_pretty indents with two spaces
    let test_cases = serde_json::to_string_pretty(&normalized.test_cases)
        .unwrap_or_else(|_| normalized.test_cases.to_string());

    let mut message = String::new();

    message.push_str("Code:\n");
    message.push_str(&normalized.code_text);
    message.push_str("\n\n");

    message.push_str("Requirements:\n");
    message.push_str(&normalized.requirements_text);
    message.push_str("\n\n");

    message.push_str("Test Cases:\n");
    message.push_str(&test_cases);
    message.push('\n');

    message
}

const REVIEW_INSTRUCTIONS: &str = r#"You are a senior QA engineer and software analyst. Your task is to:
1. Read the backend source code.
2. Review each test case from the given JSON.
3. Check whether the code satisfies the test cases based on the provided requirements.
4. If the code does not satisfy a test case, mention:
   - Which test case failed
   - Which part of the code is responsible (line number or function name)
   - Which requirement ID is affected
   - Suggest possible solutions to fix it
5. Output the traceability matrix linking requirements → test cases → code regions.
Respond in a structured JSON format with sections: "test_case_analysis", "code_traceability", and "recommendations"."#;

const OUTPUT_FORMAT_REMINDER: &str = r#"Output format (one JSON object only, no additional text):
{
  "test_case_analysis": {
    "<test case id>": "Pass" or "Fail"
  },
  "code_traceability": {
    "<requirement id>": ["<route, function name or line reference>", "..."]
  },
  "recommendations": {
    "<failing test case id>": {
      "issue": "what is wrong in the code",
      "affected_requirement": "<requirement id>",
      "solution": "how to fix it"
    }
  }
}

Rules:
- Include every test case in "test_case_analysis"
- Every test case marked "Fail" must have an entry in "recommendations"
- Every "affected_requirement" must also appear in "code_traceability"
- Use empty objects for sections with nothing to report

Remember: Return ONLY valid JSON, no markdown code blocks, no explanations."#;
