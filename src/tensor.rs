use std::fmt;

use half::f16;
use ndarray::ArrayD;
use serde::{Deserialize, Serialize};

/// Element type of a stored array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dtype {
    #[serde(rename = "float16")]
    F16,
    #[serde(rename = "float32")]
    F32,
    #[serde(rename = "float64")]
    F64,
    #[serde(rename = "int8")]
    I8,
    #[serde(rename = "int16")]
    I16,
    #[serde(rename = "int32")]
    I32,
    #[serde(rename = "int64")]
    I64,
    #[serde(rename = "uint8")]
    U8,
    #[serde(rename = "uint16")]
    U16,
    #[serde(rename = "uint32")]
    U32,
    #[serde(rename = "uint64")]
    U64,
    #[serde(rename = "bool")]
    Bool,
}

impl Dtype {
    pub fn as_str(self) -> &'static str {
        match self {
            Dtype::F16 => "float16",
            Dtype::F32 => "float32",
            Dtype::F64 => "float64",
            Dtype::I8 => "int8",
            Dtype::I16 => "int16",
            Dtype::I32 => "int32",
            Dtype::I64 => "int64",
            Dtype::U8 => "uint8",
            Dtype::U16 => "uint16",
            Dtype::U32 => "uint32",
            Dtype::U64 => "uint64",
            Dtype::Bool => "bool",
        }
    }

    /// Size in bytes of a single element.
    pub fn size(self) -> usize {
        match self {
            Dtype::I8 | Dtype::U8 | Dtype::Bool => 1,
            Dtype::F16 | Dtype::I16 | Dtype::U16 => 2,
            Dtype::F32 | Dtype::I32 | Dtype::U32 => 4,
            Dtype::F64 | Dtype::I64 | Dtype::U64 => 8,
        }
    }
}

impl fmt::Display for Dtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row-major n-dimensional array as it was stored in the container.
#[derive(Debug, Clone, PartialEq)]
pub enum TensorData {
    F16(ArrayD<f16>),
    F32(ArrayD<f32>),
    F64(ArrayD<f64>),
    I8(ArrayD<i8>),
    I16(ArrayD<i16>),
    I32(ArrayD<i32>),
    I64(ArrayD<i64>),
    U8(ArrayD<u8>),
    U16(ArrayD<u16>),
    U32(ArrayD<u32>),
    U64(ArrayD<u64>),
    Bool(ArrayD<bool>),
}

impl TensorData {
    pub fn dtype(&self) -> Dtype {
        match self {
            TensorData::F16(_) => Dtype::F16,
            TensorData::F32(_) => Dtype::F32,
            TensorData::F64(_) => Dtype::F64,
            TensorData::I8(_) => Dtype::I8,
            TensorData::I16(_) => Dtype::I16,
            TensorData::I32(_) => Dtype::I32,
            TensorData::I64(_) => Dtype::I64,
            TensorData::U8(_) => Dtype::U8,
            TensorData::U16(_) => Dtype::U16,
            TensorData::U32(_) => Dtype::U32,
            TensorData::U64(_) => Dtype::U64,
            TensorData::Bool(_) => Dtype::Bool,
        }
    }

    pub fn shape(&self) -> &[usize] {
        match self {
            TensorData::F16(a) => a.shape(),
            TensorData::F32(a) => a.shape(),
            TensorData::F64(a) => a.shape(),
            TensorData::I8(a) => a.shape(),
            TensorData::I16(a) => a.shape(),
            TensorData::I32(a) => a.shape(),
            TensorData::I64(a) => a.shape(),
            TensorData::U8(a) => a.shape(),
            TensorData::U16(a) => a.shape(),
            TensorData::U32(a) => a.shape(),
            TensorData::U64(a) => a.shape(),
            TensorData::Bool(a) => a.shape(),
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.shape().iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Casts every element to float32, keeping the shape.
    pub fn to_f32(&self) -> ArrayD<f32> {
        match self {
            TensorData::F16(a) => a.mapv(f16::to_f32),
            TensorData::F32(a) => a.clone(),
            TensorData::F64(a) => a.mapv(|x| x as f32),
            TensorData::I8(a) => a.mapv(f32::from),
            TensorData::I16(a) => a.mapv(f32::from),
            TensorData::I32(a) => a.mapv(|x| x as f32),
            TensorData::I64(a) => a.mapv(|x| x as f32),
            TensorData::U8(a) => a.mapv(f32::from),
            TensorData::U16(a) => a.mapv(f32::from),
            TensorData::U32(a) => a.mapv(|x| x as f32),
            TensorData::U64(a) => a.mapv(|x| x as f32),
            TensorData::Bool(a) => a.mapv(|x| f32::from(u8::from(x))),
        }
    }

    /// Casts every element to float32 and flattens in logical row-major order,
    /// whatever the memory layout of the underlying array is.
    pub fn to_f32_vec(&self) -> Vec<f32> {
        match self {
            TensorData::F16(a) => a.iter().map(|x| x.to_f32()).collect(),
            TensorData::F32(a) => a.iter().copied().collect(),
            TensorData::F64(a) => a.iter().map(|&x| x as f32).collect(),
            TensorData::I8(a) => a.iter().map(|&x| f32::from(x)).collect(),
            TensorData::I16(a) => a.iter().map(|&x| f32::from(x)).collect(),
            TensorData::I32(a) => a.iter().map(|&x| x as f32).collect(),
            TensorData::I64(a) => a.iter().map(|&x| x as f32).collect(),
            TensorData::U8(a) => a.iter().map(|&x| f32::from(x)).collect(),
            TensorData::U16(a) => a.iter().map(|&x| f32::from(x)).collect(),
            TensorData::U32(a) => a.iter().map(|&x| x as f32).collect(),
            TensorData::U64(a) => a.iter().map(|&x| x as f32).collect(),
            TensorData::Bool(a) => a.iter().map(|&x| f32::from(u8::from(x))).collect(),
        }
    }
}

macro_rules! impl_from_array {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<ArrayD<$ty>> for TensorData {
                fn from(value: ArrayD<$ty>) -> Self {
                    TensorData::$variant(value)
                }
            }
        )*
    };
}

impl_from_array!(
    f16 => F16,
    f32 => F32,
    f64 => F64,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    bool => Bool,
);

/// A named tensor, `<layer_name>/<kind>`.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightTensor {
    name: String,
    data: TensorData,
}

impl WeightTensor {
    pub fn new(name: impl Into<String>, data: impl Into<TensorData>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn data(&self) -> &TensorData {
        &self.data
    }

    #[inline]
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }
}

/// Tensors read from a single container, kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeightSet {
    tensors: Vec<WeightTensor>,
}

impl WeightSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a tensor, replacing any previous tensor with the same name in place.
    pub fn insert(&mut self, tensor: WeightTensor) {
        match self.tensors.iter_mut().find(|t| t.name == tensor.name) {
            Some(slot) => *slot = tensor,
            None => self.tensors.push(tensor),
        }
    }

    pub fn get(&self, name: &str) -> Option<&WeightTensor> {
        self.tensors.iter().find(|t| t.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tensors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tensors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WeightTensor> {
        self.tensors.iter()
    }
}

impl FromIterator<WeightTensor> for WeightSet {
    fn from_iter<I: IntoIterator<Item = WeightTensor>>(iter: I) -> Self {
        let mut set = WeightSet::new();
        for tensor in iter {
            set.insert(tensor);
        }
        set
    }
}
