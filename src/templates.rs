pub const NOTES_MD: &str = include_str!("../prompts/notes.md");
pub const NOTES_CONTENTS_MD: &str = include_str!("../prompts/notes_contents.md");
pub const MOCK_TEST_MD: &str = include_str!("../prompts/mock_test.md");
pub const MOCK_TEST_FORMAT_MD: &str = include_str!("../prompts/mock_test_format.md");
pub const TUTOR_MD: &str = include_str!("../prompts/tutor.md");
pub const STUDY_PLANNER_MD: &str = include_str!("../prompts/study_planner.md");
pub const BENGALI_SCRIPT_MD: &str = include_str!("../prompts/bengali_script.md");
pub const RESPONSE_FORMAT_MD: &str = include_str!("../prompts/response_format.md");
