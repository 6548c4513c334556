//! 撮影入力
//!
//! - CapturedImage: Data URL 形式の撮影画像（検証・縮小済み）
//! - CaptureDevice: カメラ/ギャラリー等の入力デバイス
//! - DeviceGuard: どの経路で抜けても必ずデバイスを解放するガード

pub mod exif;

use crate::error::{MomentError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use lazy_static::lazy_static;
use regex::Regex;
use std::io::Cursor;
use std::path::{Path, PathBuf};

lazy_static! {
    static ref DATA_URL: Regex = Regex::new(r"^data:(image/[A-Za-z0-9.+-]+);base64,(.+)$").unwrap();
}

/// 撮影画像
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedImage {
    data_url: String,
    mime_type: String,
    pub width: u32,
    pub height: u32,
}

impl CapturedImage {
    /// 画像バイト列をデコードし、長辺を `max_size` 以下に縮小してJPEGのData URLにする
    pub fn from_bytes(bytes: &[u8], max_size: u32) -> Result<Self> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| MomentError::ImageLoad(e.to_string()))?;

        let img = if img.width().max(img.height()) > max_size {
            img.resize(max_size, max_size, FilterType::Triangle)
        } else {
            img
        };

        // JPEGはアルファ非対応
        let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
        let mut buffer = Vec::new();
        rgb.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Jpeg)
            .map_err(|e| MomentError::ImageLoad(format!("JPEGエンコード失敗: {}", e)))?;

        Ok(Self {
            data_url: format!("data:image/jpeg;base64,{}", STANDARD.encode(&buffer)),
            mime_type: "image/jpeg".into(),
            width: rgb.width(),
            height: rgb.height(),
        })
    }

    pub fn from_path(path: &Path, max_size: u32) -> Result<Self> {
        if !path.exists() {
            return Err(MomentError::FileNotFound(path.display().to_string()));
        }
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes, max_size)
    }

    /// 既存のData URLを検証して取り込む（再エンコードはしない）
    pub fn from_data_url(data_url: &str) -> Result<Self> {
        let caps = DATA_URL
            .captures(data_url)
            .ok_or_else(|| MomentError::ImageLoad("Data URL形式ではありません".into()))?;

        let bytes = STANDARD
            .decode(&caps[2])
            .map_err(|e| MomentError::ImageLoad(format!("Base64デコード失敗: {}", e)))?;
        let img = image::load_from_memory(&bytes)
            .map_err(|e| MomentError::ImageLoad(e.to_string()))?;

        Ok(Self {
            data_url: data_url.to_string(),
            mime_type: caps[1].to_string(),
            width: img.width(),
            height: img.height(),
        })
    }

    pub fn data_url(&self) -> &str {
        &self.data_url
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Data URLのBase64部分
    pub fn base64_payload(&self) -> &str {
        self.data_url.split(',').nth(1).unwrap_or_default()
    }

    pub fn decode_bytes(&self) -> Result<Vec<u8>> {
        STANDARD
            .decode(self.base64_payload())
            .map_err(|e| MomentError::ImageLoad(format!("Base64デコード失敗: {}", e)))
    }
}

/// 撮影入力デバイス
///
/// `capture` が `Ok(None)` を返した場合はユーザーによるキャンセル
pub trait CaptureDevice {
    fn open(&mut self) -> Result<()>;
    fn capture(&mut self) -> Result<Option<CapturedImage>>;
    fn release(&mut self);
}

/// 開いたデバイスをDropで必ず解放する
pub struct DeviceGuard<'a, D: CaptureDevice + ?Sized> {
    device: &'a mut D,
}

impl<'a, D: CaptureDevice + ?Sized> DeviceGuard<'a, D> {
    pub fn open(device: &'a mut D) -> Result<Self> {
        if let Err(e) = device.open() {
            // 部分的に確保したリソースも戻す
            device.release();
            return Err(e);
        }
        Ok(Self { device })
    }

    pub fn capture(&mut self) -> Result<Option<CapturedImage>> {
        self.device.capture()
    }
}

impl<D: CaptureDevice + ?Sized> Drop for DeviceGuard<'_, D> {
    fn drop(&mut self) {
        self.device.release();
    }
}

/// ファイルから写真を読み込む入力（ギャラリー選択相当）
#[derive(Debug, Clone)]
pub struct FileCapture {
    path: PathBuf,
    max_image_size: u32,
    opened: bool,
}

impl FileCapture {
    pub fn new(path: impl Into<PathBuf>, max_image_size: u32) -> Self {
        Self {
            path: path.into(),
            max_image_size,
            opened: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.opened
    }

    /// 元ファイルのEXIFに記録された撮影地点
    pub fn gps(&self) -> Option<(f64, f64)> {
        let bytes = std::fs::read(&self.path).ok()?;
        exif::extract_gps(&bytes)
    }
}

impl CaptureDevice for FileCapture {
    fn open(&mut self) -> Result<()> {
        if !self.path.is_file() {
            return Err(MomentError::FileNotFound(self.path.display().to_string()));
        }
        self.opened = true;
        Ok(())
    }

    fn capture(&mut self) -> Result<Option<CapturedImage>> {
        if !self.opened {
            return Err(MomentError::Capture("デバイスが開かれていません".into()));
        }
        CapturedImage::from_path(&self.path, self.max_image_size).map(Some)
    }

    fn release(&mut self) {
        if self.opened {
            tracing::debug!("撮影入力を解放: {}", self.path.display());
        }
        self.opened = false;
    }
}
