//! Character-level LSTM scorer: embedding → single-layer LSTM → linear → sigmoid.
//!
//! Weights are read from JSON using the same tensor names and gate layout
//! (input, forget, cell, output) as a PyTorch `state_dict`, so a trained
//! model exports with `{k: v.tolist() for k, v in model.state_dict().items()}`.

use std::path::Path;

use serde::Deserialize;

use super::ClassifierError;

#[derive(Debug, Clone, Deserialize)]
pub struct LstmWeights {
    #[serde(rename = "symbol_embeddings.weight")]
    pub embedding: Vec<Vec<f32>>,
    #[serde(rename = "lstm.weight_ih_l0")]
    pub weight_ih: Vec<Vec<f32>>,
    #[serde(rename = "lstm.weight_hh_l0")]
    pub weight_hh: Vec<Vec<f32>>,
    #[serde(rename = "lstm.bias_ih_l0")]
    pub bias_ih: Vec<f32>,
    #[serde(rename = "lstm.bias_hh_l0")]
    pub bias_hh: Vec<f32>,
    #[serde(rename = "hidden2label.weight")]
    pub linear_weight: Vec<Vec<f32>>,
    #[serde(rename = "hidden2label.bias")]
    pub linear_bias: Vec<f32>,
}

#[derive(Debug, Clone)]
pub struct LstmClassifier {
    embedding_dim: usize,
    hidden_dim: usize,
    w: LstmWeights,
}

impl LstmClassifier {
    pub fn load(path: &Path) -> Result<Self, ClassifierError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ClassifierError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let weights: LstmWeights =
            serde_json::from_str(&raw).map_err(|source| ClassifierError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_weights(weights)
    }

    pub fn from_weights(w: LstmWeights) -> Result<Self, ClassifierError> {
        let embedding_dim = w.embedding.first().map_or(0, Vec::len);
        let hidden_dim = w.bias_ih.len() / 4;
        if embedding_dim == 0 || hidden_dim == 0 {
            return Err(ClassifierError::Shape("empty embedding or hidden layer".into()));
        }

        check_matrix("symbol_embeddings.weight", &w.embedding, w.embedding.len(), embedding_dim)?;
        check_matrix("lstm.weight_ih_l0", &w.weight_ih, 4 * hidden_dim, embedding_dim)?;
        check_matrix("lstm.weight_hh_l0", &w.weight_hh, 4 * hidden_dim, hidden_dim)?;
        check_len("lstm.bias_ih_l0", &w.bias_ih, 4 * hidden_dim)?;
        check_len("lstm.bias_hh_l0", &w.bias_hh, 4 * hidden_dim)?;
        check_matrix("hidden2label.weight", &w.linear_weight, 1, hidden_dim)?;
        check_len("hidden2label.bias", &w.linear_bias, 1)?;

        Ok(Self {
            embedding_dim,
            hidden_dim,
            w,
        })
    }

    pub fn rows(&self) -> usize {
        self.w.embedding.len()
    }

    /// Append zero embedding rows until `index` is addressable.
    pub fn reserve_row(&mut self, index: usize) {
        while self.w.embedding.len() <= index {
            self.w.embedding.push(vec![0.0; self.embedding_dim]);
        }
    }

    /// Probability that the encoded name is a company.
    pub fn forward(&self, symbols: &[usize]) -> f32 {
        let h_dim = self.hidden_dim;
        let mut h = vec![0.0f32; h_dim];
        let mut c = vec![0.0f32; h_dim];
        let mut gates = vec![0.0f32; 4 * h_dim];

        for &s in symbols {
            let x = &self.w.embedding[s];
            for (g, gate) in gates.iter_mut().enumerate() {
                *gate = self.w.bias_ih[g]
                    + self.w.bias_hh[g]
                    + dot(&self.w.weight_ih[g], x)
                    + dot(&self.w.weight_hh[g], &h);
            }
            for k in 0..h_dim {
                let i = sigmoid(gates[k]);
                let f = sigmoid(gates[h_dim + k]);
                let g = gates[2 * h_dim + k].tanh();
                let o = sigmoid(gates[3 * h_dim + k]);
                c[k] = f * c[k] + i * g;
                h[k] = o * c[k].tanh();
            }
        }

        sigmoid(dot(&self.w.linear_weight[0], &h) + self.w.linear_bias[0])
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

fn check_len(name: &str, v: &[f32], want: usize) -> Result<(), ClassifierError> {
    if v.len() != want {
        return Err(ClassifierError::Shape(format!(
            "{name}: expected length {want}, got {}",
            v.len()
        )));
    }
    Ok(())
}

fn check_matrix(name: &str, m: &[Vec<f32>], rows: usize, cols: usize) -> Result<(), ClassifierError> {
    if m.len() != rows {
        return Err(ClassifierError::Shape(format!(
            "{name}: expected {rows} rows, got {}",
            m.len()
        )));
    }
    if let Some(bad) = m.iter().position(|r| r.len() != cols) {
        return Err(ClassifierError::Shape(format!(
            "{name}: row {bad} has {} columns, expected {cols}",
            m[bad].len()
        )));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// One-unit model with a constant output of `sigmoid(bias)`.
    pub(crate) fn constant(rows: usize, bias: f32) -> LstmClassifier {
        LstmClassifier::from_weights(LstmWeights {
            embedding: vec![vec![0.0]; rows],
            weight_ih: vec![vec![0.0]; 4],
            weight_hh: vec![vec![0.0]; 4],
            bias_ih: vec![0.0; 4],
            bias_hh: vec![0.0; 4],
            linear_weight: vec![vec![1.0]],
            linear_bias: vec![bias],
        })
        .unwrap()
    }

    #[test]
    fn zero_weights_give_sigmoid_of_bias() {
        let m = constant(3, 0.0);
        assert!((m.forward(&[0, 1, 2]) - 0.5).abs() < 1e-6);
        let m = constant(3, -3.0);
        assert!((m.forward(&[1]) - sigmoid(-3.0)).abs() < 1e-6);
    }

    #[test]
    fn fixture_scores_multi_word_names_high() {
        let m = LstmClassifier::load(Path::new("tests/fixtures/model.json")).unwrap();
        // Row 36 is '_' in the fixture vocabulary; row 0 is 'a'.
        let with_sep = m.forward(&[0, 36, 0]);
        let without = m.forward(&[0, 0, 0]);
        assert!(with_sep > 0.9, "{with_sep}");
        assert!(without < 0.1, "{without}");
    }

    #[test]
    fn output_is_a_probability() {
        let m = LstmClassifier::load(Path::new("tests/fixtures/model.json")).unwrap();
        for seq in [vec![], vec![36; 40], vec![5, 6, 7]] {
            let p = m.forward(&seq);
            assert!((0.0..=1.0).contains(&p));
        }
    }

    #[test]
    fn reserve_row_pads_with_zeros() {
        let mut m = constant(2, 0.0);
        m.reserve_row(4);
        assert_eq!(m.rows(), 5);
    }

    #[test]
    fn mismatched_gate_matrix_is_rejected() {
        let w = LstmWeights {
            embedding: vec![vec![0.0, 0.0]; 3],
            weight_ih: vec![vec![0.0]; 4],
            weight_hh: vec![vec![0.0]; 4],
            bias_ih: vec![0.0; 4],
            bias_hh: vec![0.0; 4],
            linear_weight: vec![vec![1.0]],
            linear_bias: vec![0.0],
        };
        let err = LstmClassifier::from_weights(w).unwrap_err();
        assert!(matches!(err, ClassifierError::Shape(msg) if msg.contains("weight_ih")));
    }
}
