//! # 晶体结构与成分数据模型
//!
//! 只保留 POSCAR 解析所需的结构信息，以及按首次出现顺序排列的元素成分。
//!
//! ## 依赖关系
//! - 被 `parsers/poscar.rs` 构造
//! - `Composition` 被 `analysis/valence.rs` 使用

use serde::{Deserialize, Serialize};

/// 晶格参数表示
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lattice {
    /// 晶格向量矩阵 (3x3)，行向量表示 a, b, c
    pub matrix: [[f64; 3]; 3],
}

impl Lattice {
    pub fn from_vectors(matrix: [[f64; 3]; 3]) -> Self {
        Lattice { matrix }
    }

    /// 计算晶格体积（带符号）
    pub fn volume(&self) -> f64 {
        let a = self.matrix[0];
        let b = self.matrix[1];
        let c = self.matrix[2];

        a[0] * (b[1] * c[2] - b[2] * c[1]) - a[1] * (b[0] * c[2] - b[2] * c[0])
            + a[2] * (b[0] * c[1] - b[1] * c[0])
    }

    /// 笛卡尔坐标转分数坐标，奇异晶格时原样返回
    pub fn cart_to_frac(&self, cart: [f64; 3]) -> [f64; 3] {
        let m = self.matrix;
        let det = self.volume();

        if det.abs() < 1e-10 {
            return cart;
        }

        let inv = [
            [
                (m[1][1] * m[2][2] - m[1][2] * m[2][1]) / det,
                (m[0][2] * m[2][1] - m[0][1] * m[2][2]) / det,
                (m[0][1] * m[1][2] - m[0][2] * m[1][1]) / det,
            ],
            [
                (m[1][2] * m[2][0] - m[1][0] * m[2][2]) / det,
                (m[0][0] * m[2][2] - m[0][2] * m[2][0]) / det,
                (m[0][2] * m[1][0] - m[0][0] * m[1][2]) / det,
            ],
            [
                (m[1][0] * m[2][1] - m[1][1] * m[2][0]) / det,
                (m[0][1] * m[2][0] - m[0][0] * m[2][1]) / det,
                (m[0][0] * m[1][1] - m[0][1] * m[1][0]) / det,
            ],
        ];

        // 行向量约定: cart = frac · M，故 frac = cart · M⁻¹
        [
            cart[0] * inv[0][0] + cart[1] * inv[1][0] + cart[2] * inv[2][0],
            cart[0] * inv[0][1] + cart[1] * inv[1][1] + cart[2] * inv[2][1],
            cart[0] * inv[0][2] + cart[1] * inv[1][2] + cart[2] * inv[2][2],
        ]
    }
}

/// 原子信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Atom {
    /// 元素符号
    pub element: String,

    /// 分数坐标 [x, y, z]
    pub position: [f64; 3],
}

impl Atom {
    pub fn new(element: impl Into<String>, position: [f64; 3]) -> Self {
        Atom {
            element: element.into(),
            position,
        }
    }
}

/// 晶体结构
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Crystal {
    /// 结构名称（POSCAR 注释行）
    pub name: String,

    pub lattice: Lattice,

    pub atoms: Vec<Atom>,
}

impl Crystal {
    pub fn new(name: impl Into<String>, lattice: Lattice, atoms: Vec<Atom>) -> Self {
        Crystal {
            name: name.into(),
            lattice,
            atoms,
        }
    }

    /// 按原子出现顺序统计成分
    pub fn composition(&self) -> Composition {
        Composition::from_symbols(self.atoms.iter().map(|a| a.element.as_str()))
    }
}

/// 元素成分：有序的 (元素, 原子数) 列表
///
/// 顺序为元素在结构中首次出现的顺序，计数恒为正。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Composition {
    entries: Vec<(String, usize)>,
}

impl Composition {
    /// 从逐原子的元素符号序列统计
    pub fn from_symbols<'a, I>(symbols: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut entries: Vec<(String, usize)> = Vec::new();

        for symbol in symbols {
            match entries.iter_mut().find(|(s, _)| s == symbol) {
                Some((_, count)) => *count += 1,
                None => entries.push((symbol.to_string(), 1)),
            }
        }

        Composition { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(s, n)| (s.as_str(), *n))
    }

    pub fn elements(&self) -> Vec<&str> {
        self.entries.iter().map(|(s, _)| s.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn num_atoms(&self) -> usize {
        self.entries.iter().map(|(_, n)| n).sum()
    }

    /// 化学式，保持成分顺序，例如 `Fe2O3`
    pub fn formula(&self) -> String {
        self.entries
            .iter()
            .map(|(el, count)| {
                if *count == 1 {
                    el.clone()
                } else {
                    format!("{}{}", el, count)
                }
            })
            .collect()
    }
}
