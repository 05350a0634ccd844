use super::*;
use crate::algebra::*;
use crate::blocks::{CompositeBlock, SupportedConeBlockT};
use crate::io::ConfigurablePrintTarget;
use std::io::Write;
use std::time::Duration;

impl<T> ConfigurablePrintTarget for DefaultInfo<T> {
    fn print_to_stdout(&mut self) {
        self.stream.print_to_stdout()
    }
    fn print_to_file(&mut self, file: std::fs::File) {
        self.stream.print_to_file(file)
    }
    fn print_to_stream(&mut self, stream: Box<dyn Write + Send + Sync>) {
        self.stream.print_to_stream(stream)
    }
    fn print_to_buffer(&mut self) {
        self.stream.print_to_buffer()
    }
    fn print_to_sink(&mut self) {
        self.stream.print_to_sink()
    }
    fn get_print_buffer(&mut self) -> std::io::Result<String> {
        self.stream.get_print_buffer()
    }
}

macro_rules! expformat {
    ($fmt:expr,$val:expr) => {
        if $val.is_finite() {
            _exp_str_reformat(format!($fmt, $val))
        } else {
            format!($fmt, $val)
        }
    };
}

impl<T> DefaultInfo<T>
where
    T: FloatT,
{
    pub(crate) fn print_configuration(
        &mut self,
        settings: &DefaultSettings<T>,
        data: &DefaultProblemData<T>,
        blocks: &CompositeBlock<T>,
    ) -> std::io::Result<()> {
        if !settings.verbose {
            return std::io::Result::Ok(());
        }

        let out = &mut self.stream;

        writeln!(out, "-------------------------------------------------------------")?;
        writeln!(
            out,
            "           conicblocks v{}  -  dense reference solver\n",
            crate::VERSION
        )?;
        writeln!(out, "-------------------------------------------------------------")?;

        writeln!(out, "\nproblem:")?;
        writeln!(out, "  variables     = {}", data.n)?;
        writeln!(out, "  constraints   = {}", data.m)?;
        writeln!(out, "  blocks        = {}", blocks.len())?;
        writeln!(out, "  degree        = {}", blocks.degree())?;
        _print_blocks(out, blocks.types())?;

        writeln!(out, "\nsettings:")?;
        writeln!(
            out,
            "  linear algebra: dense / cholesky, precision: {} bit",
            _get_precision_string::<T>()
        )?;

        let time_lim_str = {
            if settings.time_limit.is_infinite() {
                "Inf".to_string()
            } else {
                format!("{:?}", settings.time_limit)
            }
        };
        writeln!(
            out,
            "  max iter = {}, time limit = {},  max step = {:.3}",
            settings.max_iter, time_lim_str, settings.max_step_fraction
        )?;
        writeln!(
            out,
            "  tol_feas = {:.1e}, tol_gap_abs = {:.1e}, tol_gap_rel = {:.1e},",
            settings.tol_feas, settings.tol_gap_abs, settings.tol_gap_rel
        )?;
        if settings.neighborhood_enable {
            writeln!(out, "  neighborhood : on, ubnd = {:.3}", settings.nbh_ubnd)?;
        } else {
            writeln!(out, "  neighborhood : off")?;
        }
        writeln!(out)?;

        std::io::Result::Ok(())
    }

    pub(crate) fn print_status_header(&mut self, settings: &DefaultSettings<T>) -> std::io::Result<()> {
        if !settings.verbose {
            return std::io::Result::Ok(());
        }

        let out = &mut self.stream;

        //print a subheader for the iterations info
        write!(out, "iter    ")?;
        write!(out, "pcost        ")?;
        write!(out, "dcost       ")?;
        write!(out, "gap       ")?;
        write!(out, "pres      ")?;
        write!(out, "dres      ")?;
        write!(out, " μ       ")?;
        write!(out, "σ         ")?;
        write!(out, "step      ")?;
        writeln!(out,)?;
        writeln!(
            out,
            "-------------------------------------------------------------------------------------------"
        )?;
        out.flush()?;
        std::io::Result::Ok(())
    }

    pub(crate) fn print_status(&mut self, settings: &DefaultSettings<T>) -> std::io::Result<()> {
        if !settings.verbose {
            return std::io::Result::Ok(());
        }

        let out = &mut self.stream;

        write!(out, "{:>3}  ", self.iterations)?;
        write!(out, "{}  ", expformat!("{:+8.4e}", self.cost_primal))?;
        write!(out, "{}  ", expformat!("{:+8.4e}", self.cost_dual))?;
        let gapprint = T::min(self.gap_abs, self.gap_rel);
        write!(out, "{}  ", expformat!("{:6.2e}", gapprint))?;
        write!(out, "{}  ", expformat!("{:6.2e}", self.res_primal))?;
        write!(out, "{}  ", expformat!("{:6.2e}", self.res_dual))?;
        write!(out, "{}  ", expformat!("{:6.2e}", self.μ))?;

        if self.iterations > 0 {
            write!(out, "{}  ", expformat!("{:6.2e}", self.sigma))?;
            write!(out, "{}  ", expformat!("{:>.2e}", self.step_length))?;
        } else {
            write!(out, " ------    ")?; //info.sigma
            write!(out, " ------   ")?; //info.step_length
        }

        writeln!(out,)?;

        std::io::Result::Ok(())
    }

    pub(crate) fn print_footer(&mut self, settings: &DefaultSettings<T>) -> std::io::Result<()> {
        if !settings.verbose {
            return std::io::Result::Ok(());
        }

        let out = &mut self.stream;

        writeln!(
            out,
            "-------------------------------------------------------------------------------------------"
        )?;

        writeln!(out, "Terminated with status = {}", self.status)?;

        writeln!(
            out,
            "solve time = {:?}",
            Duration::from_secs_f64(self.solve_time)
        )?;

        std::io::Result::Ok(())
    }
}

fn _get_precision_string<T: FloatT>() -> String {
    (::std::mem::size_of::<T>() * 8).to_string()
}

fn _print_blocks(out: &mut dyn Write, types: &[SupportedConeBlockT]) -> std::io::Result<()> {
    let maxlistlen = 5;

    if types.is_empty() {
        return std::io::Result::Ok(());
    }

    write!(out, "    : ")?;
    for (i, t) in types.iter().take(maxlistlen).enumerate() {
        if i > 0 {
            write!(out, ", ")?;
        }
        write!(out, "{}", t)?;
    }
    if types.len() > maxlistlen {
        write!(out, ", ...")?;
    }
    writeln!(out)?;

    std::io::Result::Ok(())
}

// convert a string in LowerExp display format into one that
// 1) always has a sign after the exponent, and
// 2) has at least two digits in the exponent.

fn _exp_str_reformat(mut thestr: String) -> String {
    let Some(eidx) = thestr.find('e') else {
        return thestr;
    };
    let has_sign = thestr[eidx + 1..].starts_with('-');

    let has_short_exp = {
        if !has_sign {
            thestr.len() == eidx + 2
        } else {
            thestr.len() == eidx + 3
        }
    };

    let chars = match (has_sign, has_short_exp) {
        (false, true) => "+0",
        (false, false) => "+",
        (true, true) => "0",
        (true, false) => "",
    };

    let shift = if has_sign { 2 } else { 1 };
    thestr.insert_str(eidx + shift, chars);
    thestr
}

#[test]
fn test_exp_str_reformat() {
    assert_eq!(_exp_str_reformat(format!("{:.2e}", 1.5e-3)), "1.50e-03");
    assert_eq!(_exp_str_reformat(format!("{:.2e}", 1.5e3)), "1.50e+03");
    assert_eq!(_exp_str_reformat(format!("{:.2e}", 2.0e12)), "2.00e+12");
    assert_eq!(_exp_str_reformat("inf".to_string()), "inf");
}
