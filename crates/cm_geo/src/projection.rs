// crates/cm_geo/src/projection.rs

//! 纯 Rust 实现的坐标投影转换
//!
//! 支持的投影类型：
//! - WGS84 地理坐标 (EPSG:4326)，恒等变换
//! - Web Mercator (EPSG:3857)
//! - Mollweide 等积投影 (ESRI:54009)
//!
//! Mollweide 是匹配引擎的等积工作投影：地理坐标输入在计算面积/长度前
//! 先投影到该坐标系，保证度量以米为单位且面积不失真。
//!
//! # 示例
//!
//! ```
//! use cm_geo::projection::Projection;
//!
//! let proj = Projection::from_epsg(3857).unwrap();
//! let (x, y) = proj.forward(116.0, 40.0).unwrap();
//! let (lon, lat) = proj.inverse(x, y).unwrap();
//! assert!((lon - 116.0).abs() < 1e-9);
//! ```

use crate::error::{GeoError, GeoResult};
use std::f64::consts::PI;

/// WGS84 长半轴 (米)，Web Mercator 与球面 Mollweide 均以此为半径
pub const WGS84_SEMI_MAJOR: f64 = 6_378_137.0;

/// Web Mercator 最大纬度 (度)
pub const WEB_MERCATOR_MAX_LAT: f64 = 85.051_128_779;

/// Mollweide θ 迭代的收敛容差
const MOLLWEIDE_TOLERANCE: f64 = 1e-12;

/// Mollweide θ 迭代的最大次数
const MOLLWEIDE_MAX_ITER: usize = 50;

/// 支持的投影
///
/// 使用 enum 而非 trait object，静态分发避免动态开销。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    /// WGS84 地理坐标（恒等变换，输出仍为度）
    Geographic,
    /// Web Mercator (EPSG:3857)
    WebMercator,
    /// Mollweide 等积投影 (ESRI:54009)
    Mollweide,
}

impl Projection {
    /// 从 EPSG 代码解析投影
    ///
    /// # Errors
    /// 代码不受支持时返回 [`GeoError::UnsupportedCrs`]
    pub fn from_epsg(code: u32) -> GeoResult<Self> {
        match code {
            4326 => Ok(Self::Geographic),
            3857 | 900_913 => Ok(Self::WebMercator),
            54009 => Ok(Self::Mollweide),
            other => Err(GeoError::UnsupportedCrs(other)),
        }
    }

    /// 投影名称
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Geographic => "Geographic",
            Self::WebMercator => "WebMercator",
            Self::Mollweide => "Mollweide",
        }
    }

    /// 正向投影：地理坐标 -> 平面坐标
    ///
    /// # Arguments
    /// - `lon`: 经度 (度)
    /// - `lat`: 纬度 (度)
    ///
    /// # Returns
    /// (x, y) 平面坐标 (米)；地理坐标投影返回原值 (度)
    ///
    /// # Errors
    /// 坐标非有限数时返回错误
    pub fn forward(&self, lon: f64, lat: f64) -> GeoResult<(f64, f64)> {
        if !lon.is_finite() || !lat.is_finite() {
            return Err(GeoError::projection(format!(
                "non-finite input coordinate ({lon}, {lat})"
            )));
        }
        match self {
            Self::Geographic => Ok((lon, lat)),
            Self::WebMercator => Ok(geographic_to_web_mercator(lon, lat)),
            Self::Mollweide => geographic_to_mollweide(lon, lat),
        }
    }

    /// 逆向投影：平面坐标 -> 地理坐标
    ///
    /// # Returns
    /// (lon, lat) 经度和纬度 (度)
    ///
    /// # Errors
    /// 坐标非有限数或超出投影有效范围时返回错误
    pub fn inverse(&self, x: f64, y: f64) -> GeoResult<(f64, f64)> {
        if !x.is_finite() || !y.is_finite() {
            return Err(GeoError::projection(format!(
                "non-finite input coordinate ({x}, {y})"
            )));
        }
        match self {
            Self::Geographic => Ok((x, y)),
            Self::WebMercator => Ok(web_mercator_to_geographic(x, y)),
            Self::Mollweide => mollweide_to_geographic(x, y),
        }
    }
}

// ============================================================================
// Web Mercator
// ============================================================================

/// 地理坐标 -> Web Mercator
///
/// 纬度自动裁剪到有效范围
#[must_use]
pub fn geographic_to_web_mercator(lon: f64, lat: f64) -> (f64, f64) {
    let lat = lat.clamp(-WEB_MERCATOR_MAX_LAT, WEB_MERCATOR_MAX_LAT);

    let x = WGS84_SEMI_MAJOR * lon.to_radians();
    let lat_rad = lat.to_radians();
    let y = WGS84_SEMI_MAJOR * ((PI / 4.0 + lat_rad / 2.0).tan()).ln();

    (x, y)
}

/// Web Mercator -> 地理坐标
#[must_use]
pub fn web_mercator_to_geographic(x: f64, y: f64) -> (f64, f64) {
    let lon = (x / WGS84_SEMI_MAJOR).to_degrees();
    let lat = (2.0 * (y / WGS84_SEMI_MAJOR).exp().atan() - PI / 2.0).to_degrees();

    (lon, lat)
}

// ============================================================================
// Mollweide
// ============================================================================

/// 地理坐标 -> Mollweide
///
/// 牛顿迭代求解辅助角 θ：2θ + sin 2θ = π sin φ
fn geographic_to_mollweide(lon: f64, lat: f64) -> GeoResult<(f64, f64)> {
    if !(-90.0..=90.0).contains(&lat) {
        return Err(GeoError::projection(format!(
            "latitude {lat} out of range [-90, 90]"
        )));
    }

    let lam = lon.to_radians();
    let phi = lat.to_radians();
    let rhs = PI * phi.sin();

    // 极点处迭代分母趋零，直接取解析解
    let mut theta = phi;
    if (phi.abs() - PI / 2.0).abs() > 1e-12 {
        for _ in 0..MOLLWEIDE_MAX_ITER {
            let f = 2.0 * theta + (2.0 * theta).sin() - rhs;
            let df = 2.0 + 2.0 * (2.0 * theta).cos();
            if df.abs() < 1e-14 {
                break;
            }
            let next = theta - f / df;
            if (next - theta).abs() < MOLLWEIDE_TOLERANCE {
                theta = next;
                break;
            }
            theta = next;
        }
    } else {
        theta = if phi > 0.0 { PI / 2.0 } else { -PI / 2.0 };
    }

    let sqrt2 = std::f64::consts::SQRT_2;
    let x = WGS84_SEMI_MAJOR * (2.0 * sqrt2 / PI) * lam * theta.cos();
    let y = WGS84_SEMI_MAJOR * sqrt2 * theta.sin();

    Ok((x, y))
}

/// Mollweide -> 地理坐标
fn mollweide_to_geographic(x: f64, y: f64) -> GeoResult<(f64, f64)> {
    let sqrt2 = std::f64::consts::SQRT_2;
    let sin_theta = y / (WGS84_SEMI_MAJOR * sqrt2);
    if sin_theta.abs() > 1.0 + 1e-12 {
        return Err(GeoError::projection(format!(
            "y coordinate {y} outside Mollweide extent"
        )));
    }
    let theta = sin_theta.clamp(-1.0, 1.0).asin();

    let phi = ((2.0 * theta + (2.0 * theta).sin()) / PI).clamp(-1.0, 1.0).asin();

    let cos_theta = theta.cos();
    let lam = if cos_theta.abs() < 1e-12 {
        // 极点处经度不定，取 0
        0.0
    } else {
        PI * x / (2.0 * WGS84_SEMI_MAJOR * sqrt2 * cos_theta)
    };

    Ok((lam.to_degrees(), phi.to_degrees()))
}

// ============================================================================
// 测试
// ============================================================================
