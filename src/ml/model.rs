use burn::{
    nn::{
        loss::CrossEntropyLossConfig,
        Linear, LinearConfig,
    },
    prelude::*,
    tensor::activation::relu,
};

use crate::ml::encoder::BertEncoder;

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct ClassifierHeadConfig {
    /// Width of the pooled encoder output
    pub d_input:     usize,
    #[config(default = 512)]
    pub d_hidden_1:  usize,
    #[config(default = 256)]
    pub d_hidden_2:  usize,
    #[config(default = 64)]
    pub d_hidden_3:  usize,
    #[config(default = 2)]
    pub num_classes: usize,
}

impl ClassifierHeadConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> ClassifierHead<B> {
        ClassifierHead {
            fc1: LinearConfig::new(self.d_input,    self.d_hidden_1).init(device),
            fc2: LinearConfig::new(self.d_hidden_1, self.d_hidden_2).init(device),
            fc3: LinearConfig::new(self.d_hidden_2, self.d_hidden_3).init(device),
            fc4: LinearConfig::new(self.d_hidden_3, self.num_classes).init(device),
        }
    }
}

/// Four linear layers with ReLU in between; the last one emits logits.
#[derive(Module, Debug)]
pub struct ClassifierHead<B: Backend> {
    pub fc1: Linear<B>,
    pub fc2: Linear<B>,
    pub fc3: Linear<B>,
    pub fc4: Linear<B>,
}

impl<B: Backend> ClassifierHead<B> {
    /// pooled: [batch, d_input] → logits: [batch, num_classes]
    pub fn forward(&self, pooled: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = relu(self.fc1.forward(pooled));
        let x = relu(self.fc2.forward(x));
        let x = relu(self.fc3.forward(x));
        self.fc4.forward(x)
    }
}

/// Frozen pretrained encoder + trainable classifier head.
#[derive(Module, Debug)]
pub struct SentimentModel<B: Backend> {
    pub encoder: BertEncoder<B>,
    pub head:    ClassifierHead<B>,
}

impl<B: Backend> SentimentModel<B> {
    /// Stack `head` on `encoder`, marking every encoder parameter
    /// as not requiring gradients.
    pub fn new(encoder: BertEncoder<B>, head: ClassifierHead<B>) -> Self {
        Self { encoder: encoder.no_grad(), head }
    }

    /// input_ids, attention_mask: [batch, seq_len] → logits: [batch, num_classes]
    pub fn forward(
        &self,
        input_ids:      Tensor<B, 2, Int>,
        attention_mask: Tensor<B, 2, Int>,
    ) -> Tensor<B, 2> {
        // detach() cuts the graph, so backward() stops at the head input
        let pooled = self.encoder.forward(input_ids, attention_mask).detach();
        self.head.forward(pooled)
    }

    /// Mean cross-entropy over the batch, plus the logits it was computed from
    pub fn forward_loss(
        &self,
        input_ids:      Tensor<B, 2, Int>,
        attention_mask: Tensor<B, 2, Int>,
        labels:         Tensor<B, 1, Int>,
    ) -> (Tensor<B, 1>, Tensor<B, 2>) {
        let logits = self.forward(input_ids, attention_mask);
        let loss = CrossEntropyLossConfig::new()
            .init(&logits.device())
            .forward(logits.clone(), labels);
        (loss, logits)
    }
}

/// Number of correct arg-max predictions in a batch
pub fn count_correct<B: Backend>(logits: Tensor<B, 2>, labels: Tensor<B, 1, Int>) -> usize {
    // argmax(1) returns shape [batch, 1] — flatten to [batch]
    let preds = logits.argmax(1).flatten::<1>(0, 1);
    let correct: i64 = preds.equal(labels).int().sum().into_scalar().elem::<i64>();
    correct as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::encoder::tiny_config;
    use burn::{
        backend::{Autodiff, NdArray},
        optim::{AdamConfig, GradientsParams, Optimizer},
    };

    type TestBackend = Autodiff<NdArray>;

    fn floats<const D: usize>(t: Tensor<TestBackend, D>) -> Vec<f32> {
        t.into_data().convert::<f32>().to_vec().unwrap()
    }

    fn ints<const D: usize>(values: &[i32], shape: [usize; D]) -> Tensor<TestBackend, D, Int> {
        Tensor::<TestBackend, 1, Int>::from_ints(values, &Default::default()).reshape(shape)
    }

    #[test]
    fn test_head_outputs_two_logits() {
        let head = ClassifierHeadConfig::new(8).init::<NdArray>(&Default::default());
        let logits = head.forward(Tensor::zeros([3, 8], &Default::default()));
        assert_eq!(logits.dims(), [3, 2]);
    }

    #[test]
    fn test_training_step_only_updates_head() {
        let device  = Default::default();
        let cfg     = tiny_config();
        let model   = SentimentModel::new(
            cfg.init::<TestBackend>(&device),
            ClassifierHeadConfig::new(cfg.hidden_size)
                .with_d_hidden_1(16)
                .with_d_hidden_2(8)
                .with_d_hidden_3(4)
                .init(&device),
        );

        let encoder_before = floats(model.encoder.layers[0].intermediate.weight.val());
        let head_before    = floats(model.head.fc4.weight.val());

        let (loss, _) = model.forward_loss(
            ints(&[2, 5, 6, 0, 2, 7, 8, 9], [2, 4]),
            ints(&[1, 1, 1, 0, 1, 1, 1, 1], [2, 4]),
            ints(&[1, 0], [2]),
        );
        let grads = GradientsParams::from_grads(loss.backward(), &model);
        let mut optim = AdamConfig::new().init();
        let model = optim.step(1e-2, model, grads);

        assert_eq!(floats(model.encoder.layers[0].intermediate.weight.val()), encoder_before);
        assert_ne!(floats(model.head.fc4.weight.val()), head_before);
    }

    #[test]
    fn test_count_correct() {
        let logits = Tensor::<NdArray, 2>::from_floats([[0.1, 0.9], [0.8, 0.2], [0.3, 0.7]], &Default::default());
        let labels = Tensor::<NdArray, 1, Int>::from_ints([1, 1, 1], &Default::default());
        assert_eq!(count_correct(logits, labels), 2);
    }
}
