// Licensed under the Apache-2.0 license

//! Test fixtures: a minimal little-endian RISC-V ELF writer (file header,
//! `.strtab` and `.symtab`; enough for symbol-table parsing) and shell-script
//! stand-ins for the RISC-V toolchain.

#[cfg(target_family = "unix")]
use std::path::{Path, PathBuf};

const EM_RISCV: u16 = 243;
const ET_EXEC: u16 = 2;
const SHT_SYMTAB: u32 = 2;
const SHT_STRTAB: u32 = 3;
const STB_GLOBAL: u8 = 1;
const STT_OBJECT: u8 = 1;
const STT_FUNC: u8 = 2;

pub struct TestSymbol {
    name: &'static str,
    value: u64,
    size: u64,
    ty: u8,
}
impl TestSymbol {
    pub fn func(name: &'static str, value: u64) -> Self {
        Self {
            name,
            value,
            size: 0,
            ty: STT_FUNC,
        }
    }
    pub fn object(name: &'static str, value: u64, size: u64) -> Self {
        Self {
            name,
            value,
            size,
            ty: STT_OBJECT,
        }
    }
}

pub struct ElfBuilder {
    is_64: bool,
    symbols: Vec<TestSymbol>,
}
impl ElfBuilder {
    pub fn elf64() -> Self {
        Self {
            is_64: true,
            symbols: vec![],
        }
    }
    pub fn elf32() -> Self {
        Self {
            is_64: false,
            symbols: vec![],
        }
    }
    pub fn symbol(mut self, sym: TestSymbol) -> Self {
        self.symbols.push(sym);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let (ehsize, shentsize, symentsize, align) = if self.is_64 {
            (64, 64, 24, 8)
        } else {
            (52, 40, 16, 4)
        };

        let mut strtab = vec![0u8];
        let mut name_offsets = vec![];
        for sym in &self.symbols {
            name_offsets.push(strtab.len() as u32);
            strtab.extend_from_slice(sym.name.as_bytes());
            strtab.push(0);
        }

        let mut symtab = vec![0u8; symentsize];
        for (sym, &name) in self.symbols.iter().zip(&name_offsets) {
            let info = (STB_GLOBAL << 4) | sym.ty;
            put_u32(&mut symtab, name);
            if self.is_64 {
                symtab.push(info);
                symtab.push(0);
                put_u16(&mut symtab, 1);
                put_u64(&mut symtab, sym.value);
                put_u64(&mut symtab, sym.size);
            } else {
                put_u32(&mut symtab, sym.value as u32);
                put_u32(&mut symtab, sym.size as u32);
                symtab.push(info);
                symtab.push(0);
                put_u16(&mut symtab, 1);
            }
        }

        let strtab_off = ehsize;
        let symtab_off = align_up(strtab_off + strtab.len(), align);
        let shoff = align_up(symtab_off + symtab.len(), align);

        let mut out = vec![0x7f, b'E', b'L', b'F'];
        out.push(if self.is_64 { 2 } else { 1 });
        out.push(1); // little endian
        out.push(1); // EV_CURRENT
        out.resize(16, 0);
        put_u16(&mut out, ET_EXEC);
        put_u16(&mut out, EM_RISCV);
        put_u32(&mut out, 1);
        self.put_word(&mut out, 0); // entry
        self.put_word(&mut out, 0); // phoff
        self.put_word(&mut out, shoff as u64);
        put_u32(&mut out, 0); // flags
        put_u16(&mut out, ehsize as u16);
        put_u16(&mut out, if self.is_64 { 56 } else { 32 });
        put_u16(&mut out, 0); // phnum
        put_u16(&mut out, shentsize as u16);
        put_u16(&mut out, 3); // shnum
        put_u16(&mut out, 0); // shstrndx
        assert_eq!(out.len(), ehsize);

        out.extend_from_slice(&strtab);
        out.resize(symtab_off, 0);
        out.extend_from_slice(&symtab);
        out.resize(shoff, 0);

        out.resize(out.len() + shentsize, 0);
        self.put_shdr(&mut out, SHT_STRTAB, strtab_off, strtab.len(), 0, 0, 1, 0);
        self.put_shdr(
            &mut out,
            SHT_SYMTAB,
            symtab_off,
            symtab.len(),
            1,
            1,
            align,
            symentsize,
        );
        out
    }

    fn put_word(&self, out: &mut Vec<u8>, val: u64) {
        if self.is_64 {
            put_u64(out, val);
        } else {
            put_u32(out, val as u32);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn put_shdr(
        &self,
        out: &mut Vec<u8>,
        sh_type: u32,
        offset: usize,
        size: usize,
        link: u32,
        info: u32,
        addralign: usize,
        entsize: usize,
    ) {
        put_u32(out, 0); // name
        put_u32(out, sh_type);
        self.put_word(out, 0); // flags
        self.put_word(out, 0); // addr
        self.put_word(out, offset as u64);
        self.put_word(out, size as u64);
        put_u32(out, link);
        put_u32(out, info);
        self.put_word(out, addralign as u64);
        self.put_word(out, entsize as u64);
    }
}

fn align_up(val: usize, align: usize) -> usize {
    val.div_ceil(align) * align
}
fn put_u16(out: &mut Vec<u8>, val: u16) {
    out.extend_from_slice(&val.to_le_bytes());
}
fn put_u32(out: &mut Vec<u8>, val: u32) {
    out.extend_from_slice(&val.to_le_bytes());
}
fn put_u64(out: &mut Vec<u8>, val: u64) {
    out.extend_from_slice(&val.to_le_bytes());
}

/// Fake `gcc`/`objcopy`/`objdump` scripts in one directory. Every invocation
/// appends a line to `calls.log`, starting with the tool's file name.
#[cfg(target_family = "unix")]
pub struct FakeToolchain {
    dir: PathBuf,
}
#[cfg(target_family = "unix")]
impl FakeToolchain {
    pub fn new(dir: &Path) -> Self {
        crate::fs::create_dir_all(dir).unwrap();
        Self {
            dir: dir.to_owned(),
        }
    }

    /// Installs `<prefix>objcopy`, which hands the ELF through unchanged, and
    /// `<prefix>objdump`, which prints its first two arguments. Returns the
    /// tool prefix to put in the config.
    pub fn binutils(&self, prefix: &str) -> String {
        let log_call = format!("echo \"${{0##*/}} $*\" >> \"{}\"\n", self.log_path().display());
        // objcopy -I <bfd> -O binary <in> <out>
        self.script(
            &format!("{prefix}objcopy"),
            &format!("{log_call}cp \"$5\" \"$6\"\n"),
        );
        self.script(
            &format!("{prefix}objdump"),
            &format!("{log_call}echo \"objdump $1 $2\"\n"),
        );
        self.dir.join(prefix).display().to_string()
    }

    /// Installs `<prefix>gcc`, which copies `elf` to its `-o` output. Its log
    /// line is tagged `[header=present]` or `[header=missing]` depending on
    /// whether `header` existed when it ran.
    pub fn gcc(&self, prefix: &str, elf: &[u8], header: &Path) {
        let fixture = self.dir.join(format!("{prefix}fixture.elf"));
        crate::fs::write(&fixture, elf).unwrap();
        self.script(
            &format!("{prefix}gcc"),
            &format!(
                "state=missing\n\
                 [ -f \"{header}\" ] && state=present\n\
                 echo \"${{0##*/}}[header=$state] $*\" >> \"{log}\"\n\
                 while [ $# -gt 1 ]; do\n\
                 [ \"$1\" = \"-o\" ] && cp \"{fixture}\" \"$2\"\n\
                 shift\n\
                 done\n\
                 exit 0\n",
                header = header.display(),
                log = self.log_path().display(),
                fixture = fixture.display(),
            ),
        );
    }

    /// The tool (and gcc header state) of each logged call, in order.
    pub fn calls(&self) -> Vec<String> {
        let log = crate::fs::read(self.log_path()).unwrap();
        String::from_utf8(log)
            .unwrap()
            .lines()
            .filter_map(|line| line.split_whitespace().next())
            .map(str::to_owned)
            .collect()
    }

    fn log_path(&self) -> PathBuf {
        self.dir.join("calls.log")
    }

    fn script(&self, name: &str, body: &str) {
        use std::os::unix::fs::PermissionsExt;
        let path = self.dir.join(name);
        crate::fs::write(&path, format!("#!/bin/sh\n{body}")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }
}
