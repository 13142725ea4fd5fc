//! 应用层 - 命令（写操作）
//!
//! 注册音色与合成语音的输入

/// 注册音色命令
#[derive(Debug, Clone)]
pub struct RegisterVoice {
    /// 原始参考音频字节
    pub reference_audio: Vec<u8>,
    /// 客户端上传时的文件名
    pub reference_filename: String,
    /// 预热文本，为空时使用默认短句
    pub warmup_text: String,
    /// 语言代码，为空时使用默认语言
    pub language: String,
    /// 客户端建议的 voice_id
    pub voice_id: Option<String>,
}

/// 合成语音命令
#[derive(Debug, Clone)]
pub struct SynthesizeSpeech {
    pub voice_id: String,
    pub text: String,
    /// 覆盖注册时的语言
    pub language: Option<String>,
}
