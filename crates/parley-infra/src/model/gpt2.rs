//! GPT-2 transformer forward pass on candle.
//!
//! Weight names follow the HuggingFace `GPT2LMHeadModel` safetensors layout,
//! with or without the `transformer.` prefix. The LM head is tied to the
//! token embedding.

use candle_core::{D, Device, IndexOp, Module, Result, Tensor};
use candle_nn::{Embedding, Init, LayerNorm, VarBuilder, embedding, layer_norm};

use super::config::Gpt2Config;

/// Standard deviation GPT-2 initialises projections with. Only matters for
/// freshly created weights; tensors read from safetensors ignore it.
const INIT_STDEV: f64 = 0.02;

/// HF "Conv1D": a linear layer whose weight is stored as `(in, out)`.
struct Conv1D {
    weight: Tensor,
    bias: Tensor,
}

impl Conv1D {
    fn load(in_dim: usize, out_dim: usize, vb: VarBuilder) -> Result<Self> {
        let weight = vb.get_with_hints(
            (in_dim, out_dim),
            "weight",
            Init::Randn {
                mean: 0.,
                stdev: INIT_STDEV,
            },
        )?;
        let bias = vb.get_with_hints(out_dim, "bias", Init::Const(0.))?;
        Ok(Self { weight, bias })
    }
}

impl Module for Conv1D {
    fn forward(&self, xs: &Tensor) -> Result<Tensor> {
        xs.broadcast_matmul(&self.weight)?.broadcast_add(&self.bias)
    }
}

/// Per-layer key/value cache for incremental decoding.
///
/// One cache serves one generation call: the prompt is fed once, then each
/// new token is fed alone.
pub struct Cache {
    kvs: Vec<Option<(Tensor, Tensor)>>,
    seq_len: usize,
}

impl Cache {
    pub fn new(n_layer: usize) -> Self {
        Self {
            kvs: vec![None; n_layer],
            seq_len: 0,
        }
    }

    /// Number of positions already processed.
    pub fn seq_len(&self) -> usize {
        self.seq_len
    }
}

struct Attention {
    c_attn: Conv1D,
    c_proj: Conv1D,
    n_head: usize,
    head_dim: usize,
}

impl Attention {
    fn load(config: &Gpt2Config, vb: VarBuilder) -> Result<Self> {
        let n_embd = config.n_embd;
        Ok(Self {
            c_attn: Conv1D::load(n_embd, 3 * n_embd, vb.pp("c_attn"))?,
            c_proj: Conv1D::load(n_embd, n_embd, vb.pp("c_proj"))?,
            n_head: config.n_head,
            head_dim: config.head_dim(),
        })
    }

    /// `(b, seq, embd)` -> `(b, n_head, seq, head_dim)`
    fn split_heads(&self, xs: Tensor, b: usize, seq: usize) -> Result<Tensor> {
        xs.reshape((b, seq, self.n_head, self.head_dim))?
            .transpose(1, 2)?
            .contiguous()
    }

    fn forward(
        &self,
        xs: &Tensor,
        kv: &mut Option<(Tensor, Tensor)>,
        mask: Option<&Tensor>,
    ) -> Result<Tensor> {
        let (b, seq, n_embd) = xs.dims3()?;
        let qkv = self.c_attn.forward(xs)?;

        let q = self.split_heads(qkv.narrow(D::Minus1, 0, n_embd)?, b, seq)?;
        let mut k = self.split_heads(qkv.narrow(D::Minus1, n_embd, n_embd)?, b, seq)?;
        let mut v = self.split_heads(qkv.narrow(D::Minus1, 2 * n_embd, n_embd)?, b, seq)?;

        if let Some((past_k, past_v)) = kv.as_ref() {
            k = Tensor::cat(&[past_k, &k], 2)?;
            v = Tensor::cat(&[past_v, &v], 2)?;
        }
        *kv = Some((k.clone(), v.clone()));

        let scale = (self.head_dim as f64).sqrt();
        let scores = (q.matmul(&k.t()?)? / scale)?;
        let scores = match mask {
            Some(mask) => masked_fill(&scores, &mask.broadcast_as(scores.shape())?, f32::NEG_INFINITY)?,
            None => scores,
        };
        let weights = candle_nn::ops::softmax_last_dim(&scores)?;

        let ys = weights
            .matmul(&v)?
            .transpose(1, 2)?
            .reshape((b, seq, n_embd))?;
        self.c_proj.forward(&ys)
    }
}

struct Mlp {
    c_fc: Conv1D,
    c_proj: Conv1D,
}

impl Mlp {
    fn load(config: &Gpt2Config, vb: VarBuilder) -> Result<Self> {
        let n_embd = config.n_embd;
        Ok(Self {
            c_fc: Conv1D::load(n_embd, 4 * n_embd, vb.pp("c_fc"))?,
            c_proj: Conv1D::load(4 * n_embd, n_embd, vb.pp("c_proj"))?,
        })
    }
}

impl Module for Mlp {
    fn forward(&self, xs: &Tensor) -> Result<Tensor> {
        // gelu_new: the tanh approximation
        self.c_proj.forward(&self.c_fc.forward(xs)?.gelu()?)
    }
}

struct Block {
    ln_1: LayerNorm,
    attn: Attention,
    ln_2: LayerNorm,
    mlp: Mlp,
}

impl Block {
    fn load(config: &Gpt2Config, vb: VarBuilder) -> Result<Self> {
        let eps = config.layer_norm_epsilon;
        Ok(Self {
            ln_1: layer_norm(config.n_embd, eps, vb.pp("ln_1"))?,
            attn: Attention::load(config, vb.pp("attn"))?,
            ln_2: layer_norm(config.n_embd, eps, vb.pp("ln_2"))?,
            mlp: Mlp::load(config, vb.pp("mlp"))?,
        })
    }

    fn forward(
        &self,
        xs: &Tensor,
        kv: &mut Option<(Tensor, Tensor)>,
        mask: Option<&Tensor>,
    ) -> Result<Tensor> {
        let attn = self.attn.forward(&self.ln_1.forward(xs)?, kv, mask)?;
        let xs = (xs + attn)?;
        let mlp = self.mlp.forward(&self.ln_2.forward(&xs)?)?;
        xs + mlp
    }
}

/// GPT-2 language model with a tied LM head.
pub struct Gpt2 {
    wte: Embedding,
    wpe: Embedding,
    blocks: Vec<Block>,
    ln_f: LayerNorm,
    config: Gpt2Config,
    device: Device,
}

impl Gpt2 {
    pub fn load(vb: VarBuilder, config: &Gpt2Config) -> Result<Self> {
        let vb = if vb.contains_tensor("transformer.wte.weight") {
            vb.pp("transformer")
        } else {
            vb
        };

        let wte = embedding(config.vocab_size, config.n_embd, vb.pp("wte"))?;
        let wpe = embedding(config.max_positions(), config.n_embd, vb.pp("wpe"))?;
        let blocks = (0..config.n_layer)
            .map(|i| Block::load(config, vb.pp(format!("h.{i}"))))
            .collect::<Result<Vec<_>>>()?;
        let ln_f = layer_norm(config.n_embd, config.layer_norm_epsilon, vb.pp("ln_f"))?;

        Ok(Self {
            wte,
            wpe,
            blocks,
            ln_f,
            config: config.clone(),
            device: vb.device().clone(),
        })
    }

    pub fn config(&self) -> &Gpt2Config {
        &self.config
    }

    /// Feed `ids` after the positions already in `cache` and return the
    /// next-token logits for the last position, shape `(vocab_size,)`.
    pub fn forward(&self, ids: &[u32], cache: &mut Cache) -> Result<Tensor> {
        let seq = ids.len();
        let past = cache.seq_len;
        if seq == 0 {
            candle_core::bail!("forward called with no tokens");
        }
        if past + seq > self.config.max_positions() {
            candle_core::bail!(
                "sequence of {} tokens exceeds {} positions",
                past + seq,
                self.config.max_positions()
            );
        }

        let input = Tensor::new(ids, &self.device)?.unsqueeze(0)?;
        let positions =
            Tensor::arange(past as u32, (past + seq) as u32, &self.device)?.unsqueeze(0)?;
        let mut xs = (self.wte.forward(&input)? + self.wpe.forward(&positions)?)?;

        let mask = if seq > 1 {
            Some(causal_mask(seq, past, &self.device)?)
        } else {
            None
        };
        for (block, kv) in self.blocks.iter().zip(cache.kvs.iter_mut()) {
            xs = block.forward(&xs, kv, mask.as_ref())?;
        }
        cache.seq_len += seq;

        let last = self.ln_f.forward(&xs.i((.., seq - 1, ..))?)?;
        last.matmul(&self.wte.embeddings().t()?)?.squeeze(0)
    }
}

/// `(seq, past + seq)` mask, 1 where query `i` must not see key `j`.
fn causal_mask(seq: usize, past: usize, device: &Device) -> Result<Tensor> {
    let total = past + seq;
    let mask: Vec<u8> = (0..seq)
        .flat_map(|i| (0..total).map(move |j| u8::from(j > past + i)))
        .collect();
    Tensor::from_slice(&mask, (seq, total), device)
}

fn masked_fill(on_false: &Tensor, mask: &Tensor, on_true: f32) -> Result<Tensor> {
    let on_true = Tensor::new(on_true, on_false.device())?.broadcast_as(mask.shape().dims())?;
    mask.where_cond(&on_true, on_false)
}
