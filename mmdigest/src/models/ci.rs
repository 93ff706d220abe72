use serde::Deserialize;

/// Age (in builds) under which a `REGRESSION` still counts as recent.
const REGRESSION_MAX_AGE: u32 = 30;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct TestReport {
    pub fail_count: u32,
    pub pass_count: u32,
    pub skip_count: u32,
    pub total_count: u32,
    pub duration: f64,
    pub suites: Vec<TestSuite>,
    pub child_reports: Vec<ChildReport>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ChildReport {
    pub child: ChildRef,
    pub result: TestReport,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ChildRef {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct TestSuite {
    pub name: String,
    pub cases: Vec<TestCase>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct TestCase {
    pub class_name: String,
    pub name: String,
    pub status: String,
    pub age: u32,
    pub duration: f64,
}

impl TestCase {
    pub fn is_recent_regression(&self) -> bool {
        self.status == "FAILED" || (self.status == "REGRESSION" && self.age < REGRESSION_MAX_AGE)
    }

    /// `SimpleClassName.testName`
    pub fn display_name(&self) -> String {
        let class_name = self
            .class_name
            .rsplit_once('.')
            .map_or(self.class_name.as_str(), |(_, simple)| simple);
        format!("{}.{}", class_name, self.name)
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct BuildResult {
    pub url: String,
    pub full_display_name: String,
    pub result: Option<String>,
    /// Milliseconds since the epoch.
    pub timestamp: i64,
    pub building: bool,
    pub actions: Vec<BuildAction>,
    pub culprits: Vec<BuildAuthor>,
    pub change_set: ChangeSet,
    pub artifacts: Vec<BuildArtifact>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct BuildAction {
    pub fail_count: u32,
    pub skip_count: u32,
    pub total_count: u32,
    pub url_name: Option<String>,
    pub causes: Vec<BuildCause>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct BuildCause {
    pub short_description: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct BuildAuthor {
    pub full_name: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ChangeSet {
    pub items: Vec<ChangeSetItem>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ChangeSetItem {
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct BuildArtifact {
    pub display_path: String,
    pub relative_path: String,
}
