use crate::ai::{LlmProvider, PromptInvoker};
use crate::config::{ModelDefaults, NANO_MODEL};
use crate::crew::agent::{Agent, OutputFormat, Task};
use crate::crew::runner::{Crew, CrewError, CrewOutput};
use std::path::{Path, PathBuf};

pub const CREW_DEFAULTS: ModelDefaults = ModelDefaults::new(NANO_MODEL, 0.7, None);
pub const DEFAULT_DATA_DIR: &str = "data";

pub struct JsonProcessor {
    pub source1_path: PathBuf,
    pub source2_path: PathBuf,
    pub schema_path: PathBuf,
    pub output_path: PathBuf,
    pub verification_report_path: PathBuf,
}

impl Default for JsonProcessor {
    fn default() -> Self {
        Self::in_dir(DEFAULT_DATA_DIR)
    }
}

impl JsonProcessor {
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            source1_path: dir.join("source1.json"),
            source2_path: dir.join("source2.json"),
            schema_path: dir.join("target_schema.json"),
            output_path: dir.join("processed_output.json"),
            verification_report_path: dir.join("verification_report.json"),
        }
    }

    pub fn create_agents(&self) -> (Agent, Agent) {
        let processor = Agent::new(
            "Data Processor",
            "Process and combine data from two JSON sources into a new format",
            "You are an expert data processor specialized in combining and transforming \
             JSON data while maintaining data integrity and following specific schemas. You are efficient \
             and avoid redundant operations.",
        );
        let verifier = Agent::new(
            "Data Verifier",
            "Verify the integrity and accuracy of processed JSON data",
            "You are a meticulous data verifier who ensures all processed data \
             matches the source data and follows the specified schema. You are efficient and \
             avoid redundant operations.",
        );
        (processor, verifier)
    }

    pub fn create_tasks(&self, processor: &Agent, verifier: &Agent) -> Vec<Task> {
        let process = Task::new(
            format!(
                "Process data from {s1} and {s2}.\n\
                 Combine them according to the schema in {schema}.\n\
                 The result is saved as {out}.\n\
                 Ensure all data comes from the source files only.\n\
                 The contents of every file are included below. Process all the data at once.",
                s1 = self.source1_path.display(),
                s2 = self.source2_path.display(),
                schema = self.schema_path.display(),
                out = self.output_path.display(),
            ),
            "A JSON file containing the combined data from both source files, following the target schema.",
            processor,
        )
        .reads(&self.source1_path)
        .reads(&self.source2_path)
        .reads(&self.schema_path)
        .writes(&self.output_path, OutputFormat::Json);

        let verify = Task::new(
            format!(
                "Verify the {out} file:\n\
                 1. Check the processed output file at {out}\n\
                 2. Compare it with the first source file at {s1}\n\
                 3. Compare it with the second source file at {s2}\n\
                 4. Check it against the target schema at {schema}\n\
                 5. Verify the data integrity and schema compliance\n\
                 6. Return the verification report in json format; it is saved to {report}",
                out = self.output_path.display(),
                s1 = self.source1_path.display(),
                s2 = self.source2_path.display(),
                schema = self.schema_path.display(),
                report = self.verification_report_path.display(),
            ),
            "A detailed verification report confirming that the processed data is valid, complete, and follows the target schema.",
            verifier,
        )
        .reads(&self.output_path)
        .reads(&self.source1_path)
        .reads(&self.source2_path)
        .reads(&self.schema_path)
        .writes(&self.verification_report_path, OutputFormat::Json);

        vec![process, verify]
    }

    pub fn crew(&self) -> Crew {
        let (processor, verifier) = self.create_agents();
        let tasks = self.create_tasks(&processor, &verifier);
        Crew::new(vec![processor, verifier], tasks)
    }

    pub async fn run<P: LlmProvider>(
        &self,
        invoker: &PromptInvoker<P>,
    ) -> Result<CrewOutput, CrewError> {
        self.crew().kickoff(invoker).await
    }
}
