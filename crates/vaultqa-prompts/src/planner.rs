use vaultqa_tools::ToolDefinition;

/// System prompt for plan generation, listing every tool in `tools`.
pub fn build_planner_prompt(tools: &[ToolDefinition], max_subtasks: usize) -> String {
    let mut prompt = String::new();
    prompt.push_str(
        "You are an expert planner who breaks complex questions about a personal \
         markdown vault into structured sub-tasks.\n\n\
         **Goal**: produce a sequential execution plan that answers the user's question.\n\n",
    );
    append_tools(&mut prompt, tools);
    append_rules(&mut prompt, tools, max_subtasks);
    append_schema(&mut prompt);
    append_examples(&mut prompt, tools);
    append_reference_rule(&mut prompt);
    prompt.push_str("Answer ONLY with the JSON document, without markdown fences or extra text.");
    prompt
}

pub fn build_planner_user_message(question: &str) -> String {
    format!("Question: {question}\n\nProduce a structured plan in JSON format.")
}

fn append_tools(prompt: &mut String, tools: &[ToolDefinition]) {
    prompt.push_str("**Available tools**:\n\n");
    if tools.is_empty() {
        prompt.push_str(
            "(none: every sub-task must use \"tool\": null and is answered from context)\n\n",
        );
        return;
    }
    for (i, tool) in tools.iter().enumerate() {
        let params = tool.parameters();
        let names: Vec<&str> = params.iter().map(|p| p.name.as_str()).collect();
        prompt.push_str(&format!(
            "{}. `{}({})`: {}\n",
            i + 1,
            tool.name,
            names.join(", "),
            tool.description
        ));
        for p in &params {
            let requirement = if p.required { "required" } else { "optional" };
            prompt.push_str(&format!("   - {} ({}, {})", p.name, p.kind, requirement));
            if let Some(ref desc) = p.description {
                prompt.push_str(&format!(": {desc}"));
            }
            prompt.push('\n');
        }
        prompt.push('\n');
    }
}

fn append_rules(prompt: &mut String, tools: &[ToolDefinition], max_subtasks: usize) {
    let has = |name: &str| tools.iter().any(|t| t.name == name);

    prompt.push_str("**Important rules**:\n\n");
    if has("search_notes") {
        prompt.push_str(
            "- To find a FILE by its name, use `search_notes` (it matches names and paths, \
             not content). Example: \"Find TODO.md\" -> search_notes(keyword=\"TODO\")\n",
        );
    }
    if has("grep_content") {
        prompt.push_str(
            "- To find TEXT inside notes, use `grep_content`. \
             Example: \"Where is 'deadline' mentioned?\" -> grep_content(search_term=\"deadline\")\n",
        );
    }
    if has("read_note") {
        prompt.push_str(
            "- To read a note, use `read_note` and ALWAYS give max_lines (50-100), never null. \
             Example: read_note(file_path=\"TODO.md\", max_lines=100)\n",
        );
    }
    prompt.push_str(&format!(
        "- Use at most {max_subtasks} sub-tasks.\n\
         - A sub-task may only depend on sub-tasks listed BEFORE it.\n\
         - Use \"tool\": null for reasoning steps (summarize, compare, extract); \
         they are answered from the results of earlier sub-tasks.\n\n"
    ));
}

fn append_schema(prompt: &mut String) {
    prompt.push_str(
        "**Required JSON format**:\n\
         {\n  \"goal\": \"Overall objective\",\n  \"subtasks\": [\n    {\n      \
         \"id\": 1,\n      \"description\": \"What this sub-task does\",\n      \
         \"tool\": \"tool_name\",\n      \"parameters\": {\"param1\": \"value1\"},\n      \
         \"expected_outcome\": \"What this sub-task should produce\",\n      \
         \"dependencies\": []\n    }\n  ]\n}\n\n",
    );
}

fn append_examples(prompt: &mut String, tools: &[ToolDefinition]) {
    prompt.push_str("**Examples**:\n\n");
    prompt.push_str(
        "Question: \"Find my TODO list and tell me what is urgent\"\n\
         {\n  \"goal\": \"Find TODO.md and identify urgent items\",\n  \"subtasks\": [\n    \
         {\"id\": 1, \"description\": \"Search the vault for the TODO file\", \
         \"tool\": \"search_notes\", \"parameters\": {\"keyword\": \"TODO\"}, \
         \"expected_outcome\": \"Path to TODO.md\", \"dependencies\": []},\n    \
         {\"id\": 2, \"description\": \"Read the TODO file\", \"tool\": \"read_note\", \
         \"parameters\": {\"file_path\": \"from_task_1\", \"max_lines\": 100}, \
         \"expected_outcome\": \"Content of the TODO list\", \"dependencies\": [1]},\n    \
         {\"id\": 3, \"description\": \"Identify urgent items from their deadlines\", \
         \"tool\": null, \"parameters\": {}, \"expected_outcome\": \"List of urgent items\", \
         \"dependencies\": [2]}\n  ]\n}\n\n",
    );
    prompt.push_str(
        "Question: \"Find my notes about PyTorch and summarize them\"\n\
         {\n  \"goal\": \"Find and summarize the PyTorch notes\",\n  \"subtasks\": [\n    \
         {\"id\": 1, \"description\": \"Search for files with PyTorch in their name\", \
         \"tool\": \"search_notes\", \"parameters\": {\"keyword\": \"PyTorch\"}, \
         \"expected_outcome\": \"List of PyTorch files\", \"dependencies\": []},\n    \
         {\"id\": 2, \"description\": \"Read the first file found\", \"tool\": \"read_note\", \
         \"parameters\": {\"file_path\": \"from_task_1\", \"max_lines\": 50}, \
         \"expected_outcome\": \"Content of the file\", \"dependencies\": [1]},\n    \
         {\"id\": 3, \"description\": \"Write a summary\", \"tool\": null, \"parameters\": {}, \
         \"expected_outcome\": \"Short summary\", \"dependencies\": [2]}\n  ]\n}\n\n",
    );
    prompt.push_str(
        "Question: \"Which notes mention decision trees, and what do they say?\"\n\
         {\n  \"goal\": \"Locate mentions of decision trees and explain them\",\n  \"subtasks\": [\n    \
         {\"id\": 1, \"description\": \"Find notes whose text mentions decision trees\", \
         \"tool\": \"grep_content\", \"parameters\": {\"search_term\": \"decision tree\"}, \
         \"expected_outcome\": \"Files and matching lines\", \"dependencies\": []},\n    \
         {\"id\": 2, \"description\": \"Read the first matching note\", \"tool\": \"read_note\", \
         \"parameters\": {\"file_path\": \"from_task_1\", \"max_lines\": 80}, \
         \"expected_outcome\": \"Content of the note\", \"dependencies\": [1]},\n    \
         {\"id\": 3, \"description\": \"Explain what the notes say about decision trees\", \
         \"tool\": null, \"parameters\": {}, \"expected_outcome\": \"Explanation\", \
         \"dependencies\": [1, 2]}\n  ]\n}\n\n",
    );
    append_section_example(prompt, tools);
}

/// Structure-then-extract-section decomposition. Uses dedicated structure
/// tools when registered, otherwise reads the note and extracts by heading.
fn append_section_example(prompt: &mut String, tools: &[ToolDefinition]) {
    let has = |name: &str| tools.iter().any(|t| t.name == name);

    prompt.push_str("Question: \"What does the ML course say about decision trees?\"\n");
    if has("get_document_structure") && has("read_section") {
        prompt.push_str(
            "{\n  \"goal\": \"Find the decision trees section of the ML course and extract it\",\n  \
             \"subtasks\": [\n    \
             {\"id\": 1, \"description\": \"Find the ML course file\", \"tool\": \"search_notes\", \
             \"parameters\": {\"keyword\": \"Machine Learning\"}, \
             \"expected_outcome\": \"Path of the course (e.g. Notes/ML.md)\", \"dependencies\": []},\n    \
             {\"id\": 2, \"description\": \"Read the document structure to locate the section\", \
             \"tool\": \"get_document_structure\", \"parameters\": {\"file_path\": \"from_task_1\"}, \
             \"expected_outcome\": \"Headings of the document\", \"dependencies\": [1]},\n    \
             {\"id\": 3, \"description\": \"Read the decision trees section\", \"tool\": \"read_section\", \
             \"parameters\": {\"file_path\": \"from_task_1\", \"section_title\": \"Decision Trees\", \
             \"max_lines\": 50}, \"expected_outcome\": \"Content of the section\", \
             \"dependencies\": [1, 2]}\n  ]\n}\n\n",
        );
    } else {
        prompt.push_str(
            "{\n  \"goal\": \"Find the ML course, use its headings to locate the decision trees section and extract it\",\n  \
             \"subtasks\": [\n    \
             {\"id\": 1, \"description\": \"Find the ML course file\", \"tool\": \"search_notes\", \
             \"parameters\": {\"keyword\": \"Machine Learning\"}, \
             \"expected_outcome\": \"Path of the course (e.g. Notes/ML.md)\", \"dependencies\": []},\n    \
             {\"id\": 2, \"description\": \"Read the course with enough lines to see its headings\", \
             \"tool\": \"read_note\", \"parameters\": {\"file_path\": \"from_task_1\", \"max_lines\": 100}, \
             \"expected_outcome\": \"Course content with its markdown headings\", \"dependencies\": [1]},\n    \
             {\"id\": 3, \"description\": \"Extract only the decision trees section, using the headings\", \
             \"tool\": null, \"parameters\": {}, \"expected_outcome\": \"Content of the section\", \
             \"dependencies\": [2]}\n  ]\n}\n\n",
        );
    }
}

fn append_reference_rule(prompt: &mut String) {
    prompt.push_str(
        "**CRITICAL rule for using earlier results**:\n\
         - To pass the result of an earlier sub-task as a parameter, write \"from_task_X\" \
         where X is its id.\n\
         - Example: \"file_path\": \"from_task_1\" uses the result of sub-task 1.\n\
         - Do NOT use $(task_1), {task_1} or similar forms.\n\n",
    );
}
