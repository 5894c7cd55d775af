use std::{fs, path::Path};

use tensorflow::{Graph, ImportGraphDefOptions, Session, SessionOptions, SessionRunArgs, Tensor};

use crate::{
    error::{ModelError, PredictError},
    preprocess::ImageTensor,
};

/// Turns one preprocessed image into one score per class.
pub trait Classifier: Send + Sync {
    fn classify(&self, input: &ImageTensor) -> Result<Vec<f32>, PredictError>;
}

/// A frozen TensorFlow graph with a single image input and a single
/// probability output.
pub struct Model {
    session: Session,
    graph: Graph,
    input_op: String,
    output_op: String,
}

impl Model {
    pub fn new(model_path: &Path, input_op: &str, output_op: &str) -> Result<Self, ModelError> {
        if !model_path.exists() {
            return Err(ModelError::NotFound(model_path.display().to_string()));
        }

        let model_bytes = fs::read(model_path)?;

        let mut graph = Graph::new();
        graph.import_graph_def(&model_bytes, &ImportGraphDefOptions::new())?;

        // Fail at startup rather than on the first request.
        graph.operation_by_name_required(input_op)?;
        graph.operation_by_name_required(output_op)?;

        let session = Session::new(&SessionOptions::new(), &graph)?;

        Ok(Model {
            session,
            graph,
            input_op: input_op.to_string(),
            output_op: output_op.to_string(),
        })
    }

    fn run(&self, input: &ImageTensor) -> Result<Vec<f32>, tensorflow::Status> {
        let input_tensor = Tensor::new(&input.shape()).with_values(input.as_slice())?;

        let input_operation = self.graph.operation_by_name_required(&self.input_op)?;
        let output_operation = self.graph.operation_by_name_required(&self.output_op)?;

        let mut args = SessionRunArgs::new();
        args.add_feed(&input_operation, 0, &input_tensor);
        let output_token = args.request_fetch(&output_operation, 0);
        self.session.run(&mut args)?;

        let output_tensor: Tensor<f32> = args.fetch(output_token)?;
        Ok(output_tensor.to_vec())
    }
}

impl Classifier for Model {
    fn classify(&self, input: &ImageTensor) -> Result<Vec<f32>, PredictError> {
        self.run(input)
            .map_err(|status| PredictError::Inference(status.to_string()))
    }
}
